//! In-memory columnar table

use super::column::Column;
use crate::error::{FusionarError, Result};

/// Ordered set of named, equally long columns.
///
/// A table loaded from a missing file has no columns and no rows; every
/// lookup on it misses, which downstream stages treat as "contributed zero
/// rows".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create an empty table (no columns, no rows)
    pub fn new() -> Self {
        Self::default()
    }

    /// `const` form of [`Table::new`], usable in statics
    pub const fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Build a table from named columns, checking that lengths agree.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let mut table = Self::new();
        for (name, column) in columns {
            table.insert(name, column)?;
        }
        Ok(table)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols())
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Look up a column by name, failing with a diagnostic if absent.
    pub fn require(&self, table: &str, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| FusionarError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }

    /// Mutable column lookup
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.position(name).map(|i| &mut self.columns[i])
    }

    /// First of `candidates` that is present
    pub fn first_present<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_column(c))
    }

    /// Iterate `(name, column)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Insert a column, replacing any existing column of the same name in place.
    ///
    /// The first column inserted into a column-less table fixes the row count.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(FusionarError::LengthMismatch {
                column: name,
                expected: self.n_rows,
                actual: column.len(),
            });
        }

        match self.position(&name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Rename a column; no-op when `from` is absent.
    ///
    /// An existing column named `to` is dropped first.
    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to || !self.has_column(from) {
            return;
        }
        if let Some(i) = self.position(to) {
            self.names.remove(i);
            self.columns.remove(i);
        }
        if let Some(i) = self.position(from) {
            self.names[i] = to.to_string();
        }
    }

    /// Keep only the named columns that exist, in the given order.
    pub fn select(&self, names: &[&str]) -> Self {
        let mut out = Self {
            n_rows: self.n_rows,
            ..Self::default()
        };
        for name in names {
            if let Some(col) = self.column(name) {
                out.names.push((*name).to_string());
                out.columns.push(col.clone());
            }
        }
        out
    }

    /// Keep rows where `mask` is true
    pub fn filter(&self, mask: &[bool]) -> Self {
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&indices)
    }

    /// Select rows by position
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// Replace ±inf with null, then fill numeric/boolean nulls with zero.
    pub fn clean_numeric(&mut self) {
        for col in &mut self.columns {
            col.replace_infinite();
            col.fill_null_zero();
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("id", Column::Int(vec![Some(1), Some(2), Some(3)])),
            ("title", Column::strs([Some("a"), None, Some("ccc")])),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_table_shape() {
        let t = Table::new();
        assert_eq!(t.shape(), (0, 0));
        assert!(t.is_empty());
        assert!(t.column("id").is_none());
    }

    #[test]
    fn test_insert_rejects_length_mismatch() {
        let mut t = sample();
        let err = t.insert("x", Column::Int(vec![Some(1)])).unwrap_err();
        assert!(matches!(err, FusionarError::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut t = sample();
        t.insert("id", Column::Int(vec![Some(9), Some(8), Some(7)]))
            .unwrap();
        assert_eq!(t.column_names(), &["id", "title"]);
        assert_eq!(t.column("id").unwrap().get_key(0), Some(9));
    }

    #[test]
    fn test_rename_and_select() {
        let mut t = sample();
        t.rename("id", "user_id");
        assert!(t.has_column("user_id"));
        assert!(!t.has_column("id"));

        let s = t.select(&["title", "missing", "user_id"]);
        assert_eq!(s.column_names(), &["title", "user_id"]);
        assert_eq!(s.n_rows(), 3);
    }

    #[test]
    fn test_filter_keeps_order() {
        let t = sample().filter(&[true, false, true]);
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.column("id").unwrap().get_key(1), Some(3));
    }

    #[test]
    fn test_first_present() {
        let t = sample();
        assert_eq!(t.first_present(&["number", "id"]), Some("id"));
        assert_eq!(t.first_present(&["number"]), None);
    }
}
