//! Date-time coercion for loaded tables

use super::{Column, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date columns of the pull-request table
pub const PR_DATE_COLUMNS: [&str; 4] = ["created_at", "updated_at", "closed_at", "merged_at"];

/// Date columns of the event tables (comments, reviews, commits, timeline, issues)
pub const EVENT_DATE_COLUMNS: [&str; 3] = ["created_at", "updated_at", "submitted_at"];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp string, interpreting zone-less values as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reinterpret a column as timestamps; cells that cannot be read become null.
///
/// Integers are nanoseconds since the Unix epoch.
pub fn to_datetime(column: &Column) -> Column {
    match column {
        Column::DateTime(_) => column.clone(),
        Column::Str(values) => Column::DateTime(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_datetime))
                .collect(),
        ),
        Column::Int(values) => Column::DateTime(
            values
                .iter()
                .map(|v| v.map(DateTime::from_timestamp_nanos))
                .collect(),
        ),
        Column::Float(_) | Column::Bool(_) => Column::DateTime(vec![None; column.len()]),
    }
}

/// Coerce every present column of `names` to timestamps in place.
pub fn parse_dates(table: &mut Table, names: &[&str]) {
    for name in names {
        if let Some(col) = table.column_mut(name) {
            *col = to_datetime(col);
        }
    }
}
