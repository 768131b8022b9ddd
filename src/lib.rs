//! Fusionar: pull-request acceptance modelling
//!
//! Loads pull-request activity from parquet record sets, derives one feature
//! row per pull request, trains a random forest on whether it was merged and
//! explains the fitted model.
//!
//! # Architecture
//!
//! - `data`: parquet loading and the in-memory table model
//! - `features`: feature derivation, user/repository merge, model inputs
//! - `model`: CART trees, the bagged forest, splitting and persistence
//! - `eval`: classification metrics, TreeSHAP, permutation importance, charts
//! - `pipeline`: the training and evaluation stages
//! - `config` / `cli`: configuration, argument parsing and command handlers
//!
//! # Example
//!
//! ```no_run
//! use fusionar::config::PipelineConfig;
//! use fusionar::pipeline::{evaluate, train};
//!
//! // evaluation rebuilds features without agent indicators
//! let config = PipelineConfig {
//!     include_agents: false,
//!     ..PipelineConfig::default()
//! };
//! let trained = train(&config)?;
//! println!("{}", trained.report);
//! let evaluated = evaluate(&config)?;
//! println!("accuracy {:.3}", evaluated.accuracy);
//! # Ok::<(), fusionar::FusionarError>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod features;
pub mod model;
pub mod pipeline;

pub use error::{FusionarError, Result};
