//! Classification metrics
//!
//! Confusion matrix, per-class precision/recall/F1 with macro, micro and
//! weighted averaging, and the sklearn-layout text report.

mod average;
mod confusion;
mod metrics;
mod report;


pub use average::Average;
pub use confusion::ConfusionMatrix;
pub use metrics::MultiClassMetrics;
pub use report::{classification_report, confusion_matrix};
