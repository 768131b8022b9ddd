//! Train command implementation

use crate::cli::logging::{log, log_block};
use crate::cli::LogLevel;
use crate::config::cli::TrainArgs;
use crate::eval::format_importances;
use crate::pipeline::train;
use super::describe;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let config = args.resolve().map_err(|e| describe("Config", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Fusionar: training on {}", config.data_root.display()),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Trees: {}  Seed: {}  Test fraction: {}",
            config.n_estimators, config.seed, config.test_fraction
        ),
    );
    if let Some(agent) = &config.agent {
        log(level, LogLevel::Verbose, &format!("  Agent filter: {agent}"));
    }

    let outcome = train(&config).map_err(|e| describe("Training", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Rows: {} train / {} test, {} features",
            outcome.n_train,
            outcome.n_test,
            outcome.features.len()
        ),
    );
    log(level, LogLevel::Normal, "\nHeld-out classification report:");
    log_block(level, LogLevel::Normal, &outcome.report);
    log(
        level,
        LogLevel::Normal,
        &format!("\nTop {} impurity importances:", config.top_importances),
    );
    log_block(
        level,
        LogLevel::Normal,
        &format_importances(&outcome.importances, config.top_importances),
    );

    log(
        level,
        LogLevel::Normal,
        &format!(
            "\n✓ Saved {} and {}",
            outcome.model_path.display(),
            outcome.features_path.display()
        ),
    );
    Ok(())
}
