//! Model evaluation
//!
//! - `classification`: confusion matrix, per-class metrics, text report
//! - `tree_shap`: exact TreeSHAP attributions and the positive-class adapter
//! - `permutation`: accuracy-drop permutation importance
//! - `importance`: ranked importance tables and their CSV form
//! - `plot`: SVG bar chart of mean absolute attributions

pub mod classification;
mod importance;
mod permutation;
mod plot;
pub mod tree_shap;

pub use classification::{
    classification_report, confusion_matrix, Average, ConfusionMatrix, MultiClassMetrics,
};
pub use importance::{format_importances, rank_importances, write_importance_csv, FeatureImportance};
pub use permutation::{permutation_importance, PermutationImportance};
pub use plot::{render_importance_bar, CHART_CAPTION};
pub use tree_shap::{mean_abs, positive_class_index, positive_class_values, TreeExplainer};
