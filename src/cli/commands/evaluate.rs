//! Evaluate command implementation

use crate::cli::logging::{log, log_block};
use crate::cli::LogLevel;
use crate::config::cli::EvaluateArgs;
use crate::eval::format_importances;
use crate::pipeline::evaluate;
use super::describe;

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<(), String> {
    let config = args.resolve().map_err(|e| describe("Config", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Fusionar: evaluating model in {}",
            config.artifacts_dir.display()
        ),
    );

    let outcome = evaluate(&config).map_err(|e| describe("Evaluation", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Accuracy on {} held-out rows: {:.3}",
            outcome.n_test, outcome.accuracy
        ),
    );
    log_block(level, LogLevel::Normal, &outcome.report);

    log(
        level,
        LogLevel::Verbose,
        &format!("\nMean |SHAP| over {} training rows:", outcome.n_explained),
    );
    log_block(
        level,
        LogLevel::Verbose,
        &format_importances(&outcome.shap, config.top_importances),
    );
    log(level, LogLevel::Verbose, "\nPermutation importance:");
    log_block(
        level,
        LogLevel::Verbose,
        &format_importances(&outcome.permutation, config.top_importances),
    );

    for path in &outcome.artifacts {
        log(
            level,
            LogLevel::Normal,
            &format!("✓ Wrote {}", path.display()),
        );
    }
    Ok(())
}
