//! CLI module for fusionar
//!
//! Command handlers and console output helpers.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::LogLevel;

// Re-export Cli from config for convenience
pub use crate::config::Cli;
