//! Property tests for the table-level pipeline stages
//!
//! - Left joins never change the pull-request row count or order
//! - Splits partition the rows and keep the label ratio
//! - Feature derivation is deterministic and row-preserving
//! - Classification metrics stay bounded

use fusionar::data::{Column, Table, TableSet};
use fusionar::eval::{confusion_matrix, Average, MultiClassMetrics};
use fusionar::features::{build_features, left_join, LABEL};
use fusionar::model::{test_size, train_test_split};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// Strategy Helpers
// =============================================================================

/// Optional integer keys, some of them repeated
fn keys(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Option<i64>>> {
    vec(prop::option::weighted(0.9, 0..20i64), len)
}

fn pull_requests(n: usize) -> impl Strategy<Value = Table> {
    (
        vec(prop::sample::select(vec!["open", "closed"]), n),
        vec(any::<bool>(), n),
        vec(0..5i64, n),
    )
        .prop_map(move |(state, merged, files)| {
            Table::from_columns(vec![
                ("id", Column::Int((0..n as i64).map(Some).collect())),
                ("number", Column::Int((0..n as i64).map(|i| Some(i + 500)).collect())),
                ("state", Column::strs(state.iter().map(|s| Some(*s)))),
                (
                    "merged_at",
                    Column::strs(merged.iter().map(|m| m.then_some("2024-01-01"))),
                ),
                ("files", Column::Int(files.into_iter().map(Some).collect())),
            ])
            .unwrap()
        })
}

fn commit_details(n: usize) -> impl Strategy<Value = Table> {
    vec((0..n as i64 + 3, 0..4i64, -5..50i64), 0..40).prop_map(|rows| {
        Table::from_columns(vec![
            ("pr_id", Column::Int(rows.iter().map(|r| Some(r.0)).collect())),
            (
                "sha",
                Column::Str(rows.iter().map(|r| Some(format!("c{}", r.1))).collect()),
            ),
            ("additions", Column::Int(rows.iter().map(|r| Some(r.2)).collect())),
        ])
        .unwrap()
    })
}

// =============================================================================
// Joins and feature derivation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_left_join_preserves_rows(left_keys in keys(0..30), right_keys in keys(0..30)) {
        let n_left = left_keys.len();
        let left = Table::from_columns(vec![
            ("user_id", Column::Int(left_keys)),
            ("row", Column::Int((0..n_left as i64).map(Some).collect())),
        ])
        .unwrap();
        let n_right = right_keys.len();
        let right = Table::from_columns(vec![
            ("user_id", Column::Int(right_keys)),
            ("row", Column::Float((0..n_right).map(|i| Some(i as f64)).collect())),
        ])
        .unwrap();

        let joined = left_join(&left, &right, "user_id", "_user").unwrap();
        prop_assert_eq!(joined.n_rows(), n_left);
        prop_assert_eq!(joined.column("row"), left.column("row"));
        prop_assert!(joined.has_column("row_user"));
    }

    #[test]
    fn prop_build_features_deterministic(
        (pr, details) in (1usize..25).prop_flat_map(|n| (pull_requests(n), commit_details(n)))
    ) {
        let tables = TableSet::new()
            .with("pr", pr.clone())
            .with("pr_commit_details", details);

        let a = build_features(&tables, None).unwrap();
        let b = build_features(&tables, None).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.n_rows(), pr.n_rows());
        prop_assert_eq!(tables.get("pr"), &pr);

        let labels = a.column(LABEL).unwrap();
        for i in 0..a.n_rows() {
            let expected = pr.column("state").unwrap().get_str(i) == Some("closed")
                && !pr.column("merged_at").unwrap().is_null(i);
            prop_assert_eq!(labels.get_f64(i), Some(f64::from(u8::from(expected))));
            prop_assert!(a.column("commits").unwrap().get_f64(i).unwrap() >= 0.0);
        }
    }
}

// =============================================================================
// Splitting
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_split_partitions_rows(
        labels in vec(0..2usize, 2..200),
        fraction in 0.05f64..0.95,
        seed in any::<u64>()
    ) {
        let n = labels.len();
        let split = train_test_split(&labels, fraction, seed).unwrap();

        prop_assert_eq!(split.test.len(), test_size(n, fraction));
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
        prop_assert!(split.test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_stratified_split_tracks_ratio(
        n_pos in 5usize..100,
        n_neg in 5usize..100,
        seed in any::<u64>()
    ) {
        let labels: Vec<usize> = (0..n_pos + n_neg).map(|i| usize::from(i < n_pos)).collect();
        let split = train_test_split(&labels, 0.2, seed).unwrap();

        let positives = split.test.iter().filter(|&&i| labels[i] == 1).count() as f64;
        let expected = split.test.len() as f64 * n_pos as f64 / labels.len() as f64;
        prop_assert!((positives - expected).abs() <= 1.0);
    }

    #[test]
    fn prop_metrics_bounded(
        (y_true, y_pred) in (1usize..100).prop_flat_map(|l| (vec(0..3usize, l), vec(0..3usize, l)))
    ) {
        let cm = confusion_matrix(&y_true, &y_pred);
        prop_assert_eq!(cm.total(), y_true.len());

        let metrics = MultiClassMetrics::from_predictions(&y_true, &y_pred);
        for average in [Average::Macro, Average::Micro, Average::Weighted] {
            for value in [
                metrics.precision_avg(average),
                metrics.recall_avg(average),
                metrics.f1_avg(average),
            ] {
                prop_assert!((0.0..=1.0).contains(&value), "{value}");
            }
        }
        prop_assert!((metrics.f1_avg(Average::Micro) - cm.accuracy()).abs() < 1e-9);
    }
}
