//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! fusionar train --data-root ./data --artifacts ./artifacts
//! fusionar train --config pipeline.yaml --trees 500 --seed 7
//! fusionar evaluate --artifacts ./artifacts
//! fusionar features --output features.csv
//! fusionar inspect --data-root ./data
//! ```

mod core;

pub use core::{
    apply_overrides, load_config, parse_args, Cli, Command, EvaluateArgs, FeaturesArgs,
    InspectArgs, PipelineArgs, TrainArgs,
};
