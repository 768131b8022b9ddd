//! Group-by aggregates keyed by a normalized integer key

use crate::data::{Column, Table};
use std::collections::{HashMap, HashSet};

/// Rows per key. Rows with a null key are skipped.
pub fn group_count(table: &Table, key: &str) -> HashMap<i64, f64> {
    let mut counts = HashMap::new();
    if let Some(keys) = table.column(key) {
        for i in 0..table.n_rows() {
            if let Some(k) = keys.get_key(i) {
                *counts.entry(k).or_insert(0.0) += 1.0;
            }
        }
    }
    counts
}

/// Distinct non-null values of `value` per key.
pub fn group_nunique(table: &Table, key: &str, value: &str) -> HashMap<i64, f64> {
    let (Some(keys), Some(values)) = (table.column(key), table.column(value)) else {
        return HashMap::new();
    };

    let mut seen: HashMap<i64, HashSet<String>> = HashMap::new();
    for i in 0..table.n_rows() {
        let Some(k) = keys.get_key(i) else { continue };
        let entry = seen.entry(k).or_default();
        if let Some(v) = values.get_distinct(i) {
            entry.insert(v);
        }
    }
    seen.into_iter().map(|(k, s)| (k, s.len() as f64)).collect()
}

/// Sum of non-null `value` cells per key.
pub fn group_sum(table: &Table, key: &str, value: &str) -> HashMap<i64, f64> {
    let (Some(keys), Some(values)) = (table.column(key), table.column(value)) else {
        return HashMap::new();
    };

    let mut sums = HashMap::new();
    for i in 0..table.n_rows() {
        let Some(k) = keys.get_key(i) else { continue };
        let entry = sums.entry(k).or_insert(0.0);
        if let Some(v) = values.get_f64(i) {
            *entry += v;
        }
    }
    sums
}

/// Look every key of `keys` up in `map`, defaulting misses to 0.
pub fn map_or_zero(keys: Option<&Column>, n_rows: usize, map: &HashMap<i64, f64>) -> Vec<f64> {
    match keys {
        Some(keys) => (0..n_rows)
            .map(|i| {
                keys.get_key(i)
                    .and_then(|k| map.get(&k).copied())
                    .unwrap_or(0.0)
            })
            .collect(),
        None => vec![0.0; n_rows],
    }
}

/// Count column as integers
pub fn count_column(values: Vec<f64>) -> Column {
    Column::Int(values.into_iter().map(|v| Some(v as i64)).collect())
}

/// Sum column as floats
pub fn sum_column(values: Vec<f64>) -> Column {
    Column::Float(values.into_iter().map(Some).collect())
}
