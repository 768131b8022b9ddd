//! Seeded train/test partitioning

use crate::error::{FusionarError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Row indices of the two partitions, each ascending
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Rows used for fitting
    pub train: Vec<usize>,
    /// Held-out rows
    pub test: Vec<usize>,
}

/// Held-out row count: `ceil(fraction · n)`, kept within `1..n`.
pub fn test_size(n: usize, fraction: f64) -> usize {
    let raw = (fraction * n as f64).ceil() as usize;
    raw.clamp(1, n.saturating_sub(1).max(1))
}

/// Split `labels.len()` rows into train and test partitions.
///
/// With exactly two distinct labels the split is stratified: each class
/// contributes to the test set in proportion to its frequency (largest
/// remainder rounding). Otherwise rows are drawn uniformly.
pub fn train_test_split(labels: &[usize], test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    let n = labels.len();
    if n < 2 {
        return Err(FusionarError::EmptyDataset {
            message: format!("need at least 2 rows to split, got {n}"),
        });
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FusionarError::ConfigValue {
            field: "test_fraction".to_string(),
            message: format!("{test_fraction} is outside (0, 1)"),
            suggestion: "Use a fraction such as 0.2".to_string(),
        });
    }

    let n_test = test_size(n, test_fraction);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut test = Vec::with_capacity(n_test);
    if by_class.len() == 2 {
        let quotas = stratified_quotas(&by_class, n_test, n);
        for ((_, rows), quota) in by_class.iter_mut().zip(quotas) {
            rows.shuffle(&mut rng);
            test.extend_from_slice(&rows[..quota]);
        }
    } else {
        let mut rows: Vec<usize> = (0..n).collect();
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_test]);
    }

    test.sort_unstable();
    let mut in_test = vec![false; n];
    for &i in &test {
        in_test[i] = true;
    }
    let train = (0..n).filter(|&i| !in_test[i]).collect();

    Ok(TrainTestSplit { train, test })
}

/// Per-class test counts summing to `n_test`.
fn stratified_quotas(by_class: &BTreeMap<usize, Vec<usize>>, n_test: usize, n: usize) -> Vec<usize> {
    let exact: Vec<f64> = by_class
        .values()
        .map(|rows| n_test as f64 * rows.len() as f64 / n as f64)
        .collect();
    let mut quotas: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    let mut remaining = n_test - quotas.iter().sum::<usize>();
    for &k in order.iter().cycle().take(order.len() * 2) {
        if remaining == 0 {
            break;
        }
        if quotas[k] < sizes[k] {
            quotas[k] += 1;
            remaining -= 1;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_size_rounds_up() {
        assert_eq!(test_size(10, 0.2), 2);
        assert_eq!(test_size(11, 0.2), 3);
        assert_eq!(test_size(2, 0.2), 1);
        assert_eq!(test_size(3, 0.9), 2);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let labels: Vec<usize> = (0..53).map(|i| usize::from(i % 3 == 0)).collect();
        let split = train_test_split(&labels, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 11);
        assert_eq!(split.train.len() + split.test.len(), 53);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..53).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratification_keeps_ratio() {
        let labels: Vec<usize> = (0..100).map(|i| usize::from(i < 30)).collect();
        let split = train_test_split(&labels, 0.2, 42).unwrap();
        let positives = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(split.test.len(), 20);
        assert_eq!(positives, 6);
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let a = train_test_split(&labels, 0.2, 42).unwrap();
        let b = train_test_split(&labels, 0.2, 42).unwrap();
        let c = train_test_split(&labels, 0.2, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_single_class_is_not_stratified() {
        let split = train_test_split(&[1; 10], 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn test_rejects_tiny_or_bad_fraction() {
        assert!(train_test_split(&[1], 0.2, 42).is_err());
        assert!(train_test_split(&[0, 1, 0], 1.5, 42).is_err());
    }
}
