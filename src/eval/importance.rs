//! Ranked feature-importance tables

use crate::error::{FusionarError, Result};
use serde::Serialize;
use std::path::Path;

/// One `(feature, importance)` entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureImportance {
    /// Feature name
    pub feature: String,
    /// Importance score
    pub importance: f64,
}

/// Pair names with scores and sort descending; ties keep input order.
pub fn rank_importances(features: &[String], scores: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = features
        .iter()
        .zip(scores)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// Write `feature,importance` rows in the given order.
pub fn write_importance_csv(rows: &[FeatureImportance], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(FusionarError::serialization)?;
    for row in rows {
        writer.serialize(row).map_err(FusionarError::serialization)?;
    }
    writer
        .flush()
        .map_err(|e| FusionarError::io(format!("writing {}", path.display()), e))
}

/// Fixed-width text table of the first `top` entries
pub fn format_importances(rows: &[FeatureImportance], top: usize) -> String {
    let width = rows
        .iter()
        .take(top)
        .map(|r| r.feature.len())
        .max()
        .unwrap_or(0)
        .max("feature".len());
    let mut out = format!("{:<width$}  importance\n", "feature");
    for row in rows.iter().take(top) {
        out.push_str(&format!("{:<width$}  {:.6}\n", row.feature, row.importance));
    }
    out
}
