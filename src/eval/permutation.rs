//! Permutation feature importance
//!
//! The drop in accuracy when a single column is shuffled, repeated and
//! averaged. Columns are processed in parallel; every column replays the same
//! seeded shuffle sequence, so results do not depend on scheduling.

use crate::error::{FusionarError, Result};
use crate::model::RandomForest;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Per-feature importance statistics
#[derive(Clone, Debug, PartialEq)]
pub struct PermutationImportance {
    /// Mean accuracy drop per feature
    pub importances_mean: Vec<f64>,
    /// Standard deviation of the drop per feature
    pub importances_std: Vec<f64>,
    /// Raw drops, `(features, repeats)`
    pub importances: Array2<f64>,
}

/// Score every column of `x` by permutation.
pub fn permutation_importance(
    model: &RandomForest,
    x: &Array2<f64>,
    y: &[usize],
    n_repeats: usize,
    seed: u64,
) -> Result<PermutationImportance> {
    if y.len() != x.nrows() {
        return Err(FusionarError::LengthMismatch {
            column: "labels".to_string(),
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if n_repeats == 0 {
        return Err(FusionarError::ConfigValue {
            field: "permutation_repeats".to_string(),
            message: "must be at least 1".to_string(),
            suggestion: "Use the default of 10 repeats".to_string(),
        });
    }

    let baseline = model.score(x, y)?;
    let column_seed: u64 = StdRng::seed_from_u64(seed).random();
    tracing::debug!(baseline, features = x.ncols(), n_repeats, "permutation importance");

    let drops: Vec<Vec<f64>> = (0..x.ncols())
        .into_par_iter()
        .map(|feature| {
            let mut rng = StdRng::seed_from_u64(column_seed);
            let mut shuffled = x.clone();
            let mut order: Vec<usize> = (0..x.nrows()).collect();
            (0..n_repeats)
                .map(|_| {
                    order.shuffle(&mut rng);
                    let original = x.column(feature);
                    let mut target = shuffled.column_mut(feature);
                    for (dst, &src) in target.iter_mut().zip(&order) {
                        *dst = original[src];
                    }
                    model.score(&shuffled, y).map(|score| baseline - score)
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let importances = Array2::from_shape_fn((x.ncols(), n_repeats), |(f, r)| drops[f][r]);
    let importances_mean = importances
        .mean_axis(Axis(1))
        .map(|m| m.to_vec())
        .unwrap_or_default();
    let importances_std = importances.std_axis(Axis(1), 0.0).to_vec();

    Ok(PermutationImportance {
        importances_mean,
        importances_std,
        importances,
    })
}
