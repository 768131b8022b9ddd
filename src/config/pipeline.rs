//! Pipeline configuration
//!
//! Every stage receives a `PipelineConfig`. Values come from the built-in
//! defaults, optionally replaced by a YAML file, then by command-line flags.

use crate::error::{FusionarError, Result};
use crate::model::{ForestConfig, SplitSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_n_estimators() -> usize {
    300
}

fn default_permutation_repeats() -> usize {
    10
}

fn default_shap_sample_size() -> usize {
    2000
}

fn default_top_importances() -> usize {
    25
}

fn default_report_digits() -> usize {
    3
}

fn default_include_agents() -> bool {
    true
}

/// Paths and hyperparameters shared by every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the parquet record sets
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Directory receiving model and report artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Seed for splitting, bagging, sampling and permutation
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Held-out share of rows
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Trees in the forest
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Shuffles per feature for permutation importance
    #[serde(default = "default_permutation_repeats")]
    pub permutation_repeats: usize,

    /// Maximum training rows explained by TreeSHAP
    #[serde(default = "default_shap_sample_size")]
    pub shap_sample_size: usize,

    /// Impurity importances printed after training
    #[serde(default = "default_top_importances")]
    pub top_importances: usize,

    /// Decimals in the classification report
    #[serde(default = "default_report_digits")]
    pub report_digits: usize,

    /// Train on the `agent_*` indicator columns as well
    #[serde(default = "default_include_agents")]
    pub include_agents: bool,

    /// Restrict training to pull requests of one agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            artifacts_dir: default_artifacts_dir(),
            seed: default_seed(),
            test_fraction: default_test_fraction(),
            n_estimators: default_n_estimators(),
            permutation_repeats: default_permutation_repeats(),
            shap_sample_size: default_shap_sample_size(),
            top_importances: default_top_importances(),
            report_digits: default_report_digits(),
            include_agents: default_include_agents(),
            agent: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file; absent keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FusionarError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)
            .map_err(|e| FusionarError::io(format!("reading {}", path.display()), e))?;
        serde_yaml::from_str(&content).map_err(|e| FusionarError::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(FusionarError::ConfigValue {
                field: "test_fraction".to_string(),
                message: format!("{} is outside (0, 1)", self.test_fraction),
                suggestion: "Use a fraction such as 0.2".to_string(),
            });
        }
        let positive = [
            ("n_estimators", self.n_estimators),
            ("permutation_repeats", self.permutation_repeats),
            ("shap_sample_size", self.shap_sample_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(FusionarError::ConfigValue {
                    field: field.to_string(),
                    message: "must be at least 1".to_string(),
                    suggestion: format!("Remove '{field}' to use the default"),
                });
            }
        }
        Ok(())
    }

    /// Forest hyperparameters derived from this configuration
    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig::default()
            .with_estimators(self.n_estimators)
            .with_seed(self.seed)
    }

    /// Settings persisted with the model to reproduce its partition
    pub fn split_settings(&self) -> SplitSettings {
        SplitSettings {
            seed: self.seed,
            test_fraction: self.test_fraction,
            agent: self.agent.clone(),
            include_agents: self.include_agents,
        }
    }

    /// Copy of this configuration that selects and splits rows as `split` did.
    pub fn with_split(&self, split: &SplitSettings) -> Self {
        if self.seed != split.seed
            || self.test_fraction != split.test_fraction
            || self.agent != split.agent
        {
            tracing::warn!(
                seed = split.seed,
                test_fraction = split.test_fraction,
                agent = ?split.agent,
                "overriding split settings with the ones stored in the model"
            );
        }
        Self {
            seed: split.seed,
            test_fraction: split.test_fraction,
            agent: split.agent.clone(),
            ..self.clone()
        }
    }

    /// Path of an artifact inside the artifacts directory
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(name)
    }
}
