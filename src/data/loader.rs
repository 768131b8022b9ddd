//! Parquet record-set loading
//!
//! The data directory holds up to fourteen fixed-name parquet files. A missing
//! or unreadable file never aborts the run: it is logged and replaced with an
//! empty table, which downstream stages treat as zero contributed rows.

use super::arrow::record_batch_to_table;
use super::dates::{parse_dates, EVENT_DATE_COLUMNS, PR_DATE_COLUMNS};
use super::Table;
use crate::error::{FusionarError, Result};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Logical table names paired with their file stems, in load order.
pub const RECORD_SETS: [(&str, &str); 14] = [
    ("pr", "pull_request"),
    ("repo", "repository"),
    ("user", "user"),
    ("pr_comments", "pr_comments"),
    ("pr_reviews", "pr_reviews"),
    ("pr_review_comments_v2", "pr_review_comments_v2"),
    ("pr_commits", "pr_commits"),
    ("pr_commit_details", "pr_commit_details"),
    ("related_issue", "related_issue"),
    ("issue", "issue"),
    ("pr_timeline", "pr_timeline"),
    ("pr_task_type", "pr_task_type"),
    ("human_pr", "human_pull_request"),
    ("human_pr_task_type", "human_pr_task_type"),
];

/// Event tables whose generic date columns are normalized on load
const EVENT_TABLES: [&str; 7] = [
    "pr_comments",
    "pr_reviews",
    "pr_review_comments_v2",
    "pr_timeline",
    "pr_commits",
    "pr_commit_details",
    "issue",
];

static EMPTY: Table = Table::empty();

/// Named tables produced by the loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSet {
    tables: BTreeMap<String, Table>,
}

impl TableSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    /// Builder-style [`TableSet::insert`]
    pub fn with(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }

    /// Table by logical name; unknown names read as an empty table.
    pub fn get(&self, name: &str) -> &Table {
        self.tables.get(name).unwrap_or(&EMPTY)
    }

    /// Whether a table was registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterate `(name, table)` in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table is registered
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Read one parquet file into a table.
pub fn read_parquet(path: &Path) -> Result<Table> {
    let data_err = |message: String| FusionarError::Data {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path)
        .map_err(|e| FusionarError::io(format!("opening {}", path.display()), e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| data_err(e.to_string()))?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(|e| data_err(e.to_string()))?;

    let batches: Vec<RecordBatch> = reader
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| data_err(e.to_string()))?;
    let batch = concat_batches(&schema, &batches).map_err(|e| data_err(e.to_string()))?;

    record_batch_to_table(&batch).map_err(|e| data_err(e.to_string()))
}

/// Read a parquet file, substituting an empty table when it is missing or unreadable.
pub fn read_parquet_safe(path: &Path) -> Table {
    if !path.exists() {
        tracing::warn!(file = %path.display(), "missing record file, using empty table");
        return Table::new();
    }
    match read_parquet(path) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "unreadable record file, using empty table");
            Table::new()
        }
    }
}

/// Load every record set under `data_root` and normalize date columns.
pub fn load_all(data_root: &Path) -> TableSet {
    let mut set = TableSet::new();
    for (name, stem) in RECORD_SETS {
        let path = data_root.join(format!("{stem}.parquet"));
        let mut table = read_parquet_safe(&path);

        if name == "pr" {
            parse_dates(&mut table, &PR_DATE_COLUMNS);
        } else if EVENT_TABLES.contains(&name) {
            parse_dates(&mut table, &EVENT_DATE_COLUMNS);
        }

        tracing::debug!(table = name, rows = table.n_rows(), cols = table.n_cols(), "loaded");
        set.insert(name, table);
    }
    set
}
