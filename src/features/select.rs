//! Model input selection

use super::builder::{AGENT_PREFIX, LABEL};
use crate::data::Table;
use crate::error::{FusionarError, Result};
use ndarray::Array2;

/// Features fed to the classifier, in column order.
pub const CANDIDATE_FEATURES: [&str; 19] = [
    "title_length",
    "body_length",
    "commits",
    "changed_files",
    "additions",
    "deletions",
    "total_changes",
    "num_comments",
    "num_review_comments",
    "num_reviews",
    "num_reviewers_unique",
    "has_issue_linked",
    "pr_duration_days",
    "created_hour",
    "followers",
    "public_repos",
    "author_tenure_days",
    "forks",
    "stars",
];

/// Present candidate features, optionally followed by every `agent_*` column.
pub fn select_features(table: &Table, include_agents: bool) -> Vec<String> {
    let mut features: Vec<String> = CANDIDATE_FEATURES
        .iter()
        .filter(|name| table.has_column(name))
        .map(|name| (*name).to_string())
        .collect();

    if include_agents {
        features.extend(
            table
                .column_names()
                .iter()
                .filter(|name| name.starts_with(AGENT_PREFIX))
                .cloned(),
        );
    }
    features
}

/// Dense `(rows, features)` matrix. Nulls, text and non-finite values read as 0.
pub fn feature_matrix(table: &Table, features: &[String]) -> Result<Array2<f64>> {
    let columns = features
        .iter()
        .map(|name| table.require("features", name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((table.n_rows(), columns.len()), |(i, j)| {
        columns[j].get_f64(i).filter(|x| x.is_finite()).unwrap_or(0.0)
    }))
}

/// Class label per row (`accepted_pr`).
pub fn label_vector(table: &Table) -> Result<Vec<usize>> {
    let labels = table.require("features", LABEL)?;
    (0..table.n_rows())
        .map(|i| match labels.get_key(i) {
            Some(v) if v >= 0 => Ok(v as usize),
            _ => Err(FusionarError::ColumnType {
                column: LABEL.to_string(),
                expected: "non-negative integer".to_string(),
                actual: labels.get_distinct(i).unwrap_or_else(|| "null".to_string()),
            }),
        })
        .collect()
}
