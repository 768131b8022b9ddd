//! Fusionar CLI
//!
//! # Usage
//!
//! ```bash
//! # Fit and persist the forest
//! fusionar train --data-root ./data --artifacts ./artifacts
//!
//! # Report metrics and write attribution artifacts
//! fusionar evaluate --artifacts ./artifacts
//!
//! # Dump the merged feature table
//! fusionar features --output features.csv
//!
//! # Show the shape of each record set
//! fusionar inspect --data-root ./data
//! ```

use clap::Parser;
use fusionar::cli::{run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_flags(cli.quiet, cli.verbose);
    tracing_subscriber::fmt()
        .with_max_level(level.tracing_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
