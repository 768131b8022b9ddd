//! Inspect command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::cli::{load_config, InspectArgs};
use crate::pipeline::inspect_tables;
use super::describe;

pub fn run_inspect(args: InspectArgs, level: LogLevel) -> Result<(), String> {
    let config = load_config(&args.pipeline).map_err(|e| describe("Config", e))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Record sets in {}:", config.data_root.display()),
    );
    for (name, rows, cols) in inspect_tables(&config.data_root) {
        log(
            level,
            LogLevel::Normal,
            &format!("  {name:<24} {rows:>8} rows  {cols:>3} columns"),
        );
    }
    Ok(())
}
