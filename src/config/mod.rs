//! Pipeline configuration and command-line parsing

pub mod cli;
mod pipeline;

pub use cli::{apply_overrides, parse_args, Cli, Command};
pub use pipeline::PipelineConfig;
