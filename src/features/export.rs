//! CSV export of the merged feature table

use super::builder::LABEL;
use crate::data::Table;
use crate::error::{FusionarError, Result};
use std::path::Path;

/// Numeric and boolean columns, label last.
pub fn export_columns(table: &Table) -> Vec<&str> {
    let mut names: Vec<&str> = table
        .iter()
        .filter(|(name, col)| col.is_numeric() && *name != LABEL)
        .map(|(name, _)| name)
        .collect();
    if table.has_column(LABEL) {
        names.push(LABEL);
    }
    names
}

/// Write the numeric view of `table` to `path`. Booleans are written as 0/1.
pub fn write_feature_csv(table: &Table, path: &Path) -> Result<usize> {
    let names = export_columns(table);
    let columns: Vec<_> = names.iter().filter_map(|name| table.column(name)).collect();

    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(FusionarError::serialization)?;
    writer
        .write_record(&names)
        .map_err(FusionarError::serialization)?;

    for i in 0..table.n_rows() {
        let record: Vec<String> = columns
            .iter()
            .map(|col| col.get_f64(i).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .map_err(FusionarError::serialization)?;
    }
    writer
        .flush()
        .map_err(|e| FusionarError::io(format!("writing {}", path.display()), e))?;
    Ok(table.n_rows())
}
