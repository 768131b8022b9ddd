//! Training and evaluation stages
//!
//! Each stage takes a [`PipelineConfig`](crate::config::PipelineConfig),
//! reads the parquet record sets and writes its artifacts under
//! `artifacts_dir`. Nothing is printed here; callers decide what to show.

mod dataset;
mod evaluate;
mod train;

pub use dataset::{export_features, inspect_tables, merged_features, Dataset};
pub use evaluate::{
    evaluate, sample_rows, EvaluateOutcome, PERMUTATION_FILE, REPORT_FILE, SHAP_CHART_FILE,
    SHAP_CSV_FILE,
};
pub use train::{train, TrainOutcome};
