//! CLI command implementations

mod evaluate;
mod features;
mod inspect;
mod train;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use crate::error::FusionarError;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Evaluate(args) => evaluate::run_evaluate(args, log_level),
        Command::Features(args) => features::run_features(args, log_level),
        Command::Inspect(args) => inspect::run_inspect(args, log_level),
    }
}

/// `"<stage> error [E0xx]: <message>"`. Failures the user cannot fix from the
/// command line are also logged with their full source chain.
fn describe(stage: &str, err: FusionarError) -> String {
    if !err.is_user_error() {
        tracing::error!(code = err.code(), error = ?err, "{stage} failed");
    }
    format!("{stage} error [{}]: {err}", err.code())
}
