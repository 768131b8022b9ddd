//! Core CLI types - Cli, Command, and per-command argument structs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Fusionar: pull-request acceptance modelling
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fusionar")]
#[command(version)]
#[command(
    about = "Derive pull-request features, train an acceptance classifier and explain it"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Build features, fit the forest and persist it
    Train(TrainArgs),

    /// Score the persisted forest and write attribution artifacts
    Evaluate(EvaluateArgs),

    /// Write the merged feature table to CSV
    Features(FeaturesArgs),

    /// Print the shape of every record set
    Inspect(InspectArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct PipelineArgs {
    /// YAML pipeline configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the directory holding the parquet files
    #[arg(short, long)]
    pub data_root: Option<PathBuf>,

    /// Override the artifacts directory
    #[arg(short, long)]
    pub artifacts: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the train command
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TrainArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Override the number of trees
    #[arg(short, long)]
    pub trees: Option<usize>,

    /// Override the held-out fraction
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Only train on pull requests opened by this agent
    #[arg(long)]
    pub agent: Option<String>,

    /// Leave the agent indicator columns out of the feature set
    #[arg(long)]
    pub no_agents: bool,
}

/// Arguments for the evaluate command
///
/// The split is always rebuilt from the settings stored with the model.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Override permutation repeats per feature
    #[arg(long)]
    pub repeats: Option<usize>,

    /// Override the number of training rows explained
    #[arg(long)]
    pub shap_sample: Option<usize>,
}

/// Arguments for the features command
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Only keep pull requests opened by this agent
    #[arg(long)]
    pub agent: Option<String>,

    /// Output CSV (defaults to features.csv in the artifacts directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct InspectArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Parse CLI arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply the shared overrides to a configuration
pub fn apply_overrides(config: &mut PipelineConfig, args: &PipelineArgs) {
    if let Some(data_root) = &args.data_root {
        config.data_root.clone_from(data_root);
    }
    if let Some(artifacts) = &args.artifacts {
        config.artifacts_dir.clone_from(artifacts);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
}

/// Load `--config` (or the defaults) and apply the shared overrides.
pub fn load_config(args: &PipelineArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

impl TrainArgs {
    /// Resolve and validate the configuration for training
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = load_config(&self.pipeline)?;
        if let Some(trees) = self.trees {
            config.n_estimators = trees;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if self.agent.is_some() {
            config.agent.clone_from(&self.agent);
        }
        if self.no_agents {
            config.include_agents = false;
        }
        config.validate()?;
        Ok(config)
    }
}

impl EvaluateArgs {
    /// Resolve and validate the configuration for evaluation
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = load_config(&self.pipeline)?;
        if let Some(repeats) = self.repeats {
            config.permutation_repeats = repeats;
        }
        if let Some(sample) = self.shap_sample {
            config.shap_sample_size = sample;
        }
        config.validate()?;
        Ok(config)
    }
}

impl FeaturesArgs {
    /// Resolve the configuration and the output path
    pub fn resolve(&self) -> Result<(PipelineConfig, PathBuf)> {
        let mut config = load_config(&self.pipeline)?;
        if self.agent.is_some() {
            config.agent.clone_from(&self.agent);
        }
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| config.artifact("features.csv"));
        Ok((config, output))
    }
}
