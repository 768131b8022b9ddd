//! Features command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::cli::FeaturesArgs;
use crate::pipeline::export_features;
use super::describe;

pub fn run_features(args: FeaturesArgs, level: LogLevel) -> Result<(), String> {
    let (config, output) = args.resolve().map_err(|e| describe("Config", e))?;

    let rows = export_features(&config, &output).map_err(|e| describe("Feature", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!("✓ Wrote {rows} rows to {}", output.display()),
    );
    Ok(())
}
