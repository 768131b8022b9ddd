//! Error types
//!
//! Every variant carries a stable code (see [`FusionarError::code`]) that the
//! CLI prints next to the message.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fusionar operations.
pub type Result<T> = std::result::Result<T, FusionarError>;

/// Errors that can occur while building features, training or evaluating.
#[derive(Error, Debug)]
pub enum FusionarError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path} (drop --config to use the defaults)")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}: {message}")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message} ({suggestion})")]
    ConfigValue {
        field: String,
        message: String,
        suggestion: String,
    },

    /// The pull-request table carries none of the recognized identifier columns.
    #[error("No pull-request identifier column in table '{table}' (looked for {candidates:?})")]
    MissingKeyColumn {
        table: String,
        candidates: Vec<String>,
    },

    /// A column required by a later stage is absent.
    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// A column could not be converted to the requested type.
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnType {
        column: String,
        expected: String,
        actual: String,
    },

    /// Columns of a table disagree on their length.
    #[error("Column '{column}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// No usable rows after feature selection.
    #[error("Dataset is empty: {message}")]
    EmptyDataset { message: String },

    /// Persisted model not found.
    #[error("Model file not found: {path} (run `fusionar train` first or pass --artifacts)")]
    ModelNotFound { path: PathBuf },

    /// Persisted feature list disagrees with the rebuilt one.
    #[error("Feature mismatch: model was trained on {expected:?}, evaluation built {actual:?} (retrain with --no-agents)")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Input matrix width disagrees with the fitted model.
    #[error("Shape mismatch: model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Parquet or Arrow decoding failure.
    #[error("Data error in {path}: {message}")]
    Data { path: PathBuf, message: String },

    /// IO error with context.
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Chart rendering failure.
    #[error("Plot error: {message}")]
    Plot { message: String },
}

impl FusionarError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a serialization error from any displayable cause.
    pub fn serialization(message: impl std::fmt::Display) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
                | Self::MissingKeyColumn { .. }
                | Self::EmptyDataset { .. }
                | Self::ModelNotFound { .. }
                | Self::FeatureMismatch { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::MissingKeyColumn { .. } => "E010",
            Self::MissingColumn { .. } => "E011",
            Self::ColumnType { .. } => "E012",
            Self::LengthMismatch { .. } => "E013",
            Self::EmptyDataset { .. } => "E014",
            Self::ModelNotFound { .. } => "E020",
            Self::FeatureMismatch { .. } => "E021",
            Self::ShapeMismatch { .. } => "E022",
            Self::Data { .. } => "E030",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Plot { .. } => "E060",
        }
    }
}
