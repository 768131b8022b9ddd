//! Shared data preparation for the training and evaluation stages

use crate::config::PipelineConfig;
use crate::data::{load_all, Table, RECORD_SETS};
use crate::error::{FusionarError, Result};
use crate::features::{
    build_features, feature_matrix, label_vector, merge_with_user_repo, select_features,
    write_feature_csv,
};
use crate::model::{train_test_split, TrainTestSplit};
use ndarray::{Array2, Axis};
use std::fs;
use std::path::Path;

/// Load every record set, derive features and attach user/repository columns.
pub fn merged_features(config: &PipelineConfig) -> Result<Table> {
    let tables = load_all(&config.data_root);
    let features = build_features(&tables, config.agent.as_deref())?;
    let merged = merge_with_user_repo(&features, tables.get("user"), tables.get("repo"))?;
    tracing::info!(
        rows = merged.n_rows(),
        columns = merged.n_cols(),
        "merged feature table"
    );
    Ok(merged)
}

/// Feature matrix, labels and the seeded split
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Ordered model inputs
    pub features: Vec<String>,
    /// One row per pull request
    pub x: Array2<f64>,
    /// Acceptance label per row
    pub y: Vec<usize>,
    /// Train/test row indices
    pub split: TrainTestSplit,
}

impl Dataset {
    /// Run the full preparation chain.
    pub fn build(config: &PipelineConfig, include_agents: bool) -> Result<Self> {
        let merged = merged_features(config)?;
        Self::from_table(&merged, include_agents, config.test_fraction, config.seed)
    }

    /// Select features from an already merged table and split it.
    pub fn from_table(
        merged: &Table,
        include_agents: bool,
        test_fraction: f64,
        seed: u64,
    ) -> Result<Self> {
        let features = select_features(merged, include_agents);
        let x = feature_matrix(merged, &features)?;
        let y = label_vector(merged)?;
        let split = train_test_split(&y, test_fraction, seed)?;
        Ok(Self { features, x, y, split })
    }

    /// Rows and labels at `rows`
    pub fn subset(&self, rows: &[usize]) -> (Array2<f64>, Vec<usize>) {
        let x = self.x.select(Axis(0), rows);
        let y = rows.iter().map(|&i| self.y[i]).collect();
        (x, y)
    }

    /// Training partition
    pub fn train(&self) -> (Array2<f64>, Vec<usize>) {
        self.subset(&self.split.train)
    }

    /// Held-out partition
    pub fn test(&self) -> (Array2<f64>, Vec<usize>) {
        self.subset(&self.split.test)
    }
}

/// Write the merged feature table to `output`, returning the row count.
pub fn export_features(config: &PipelineConfig, output: &Path) -> Result<usize> {
    let merged = merged_features(config)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| FusionarError::io(format!("creating {}", parent.display()), e))?;
    }
    write_feature_csv(&merged, output)
}

/// `(logical name, rows, columns)` for every record set, in load order.
pub fn inspect_tables(data_root: &Path) -> Vec<(&'static str, usize, usize)> {
    let tables = load_all(data_root);
    RECORD_SETS
        .iter()
        .map(|(name, _)| {
            let (rows, cols) = tables.get(name).shape();
            (*name, rows, cols)
        })
        .collect()
}
