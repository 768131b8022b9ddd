//! Bagged ensemble of CART trees

use super::tree::{DecisionTree, TreeParams};
use crate::error::{FusionarError, Result};
use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of candidate features drawn at each split
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(p)))`
    Sqrt,
    /// `max(1, floor(log2(p)))`
    Log2,
    /// Every feature
    All,
    /// A fixed count, capped at `p`
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the number of features
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::Log2 => (n_features as f64).log2().floor() as usize,
            Self::All => n_features,
            Self::Count(k) => k.min(n_features),
        };
        k.max(1)
    }
}

/// Per-sample class weighting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1
    Uniform,
    /// Inverse class frequency computed on each tree's bootstrap sample
    BalancedSubsample,
}

/// Ensemble hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Candidate features per split
    pub max_features: MaxFeatures,
    /// Depth limit per tree
    pub max_depth: Option<usize>,
    /// Minimum rows to split a node
    pub min_samples_split: usize,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Class weighting
    pub class_weight: ClassWeight,
    /// Seed for per-tree seeds
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
            class_weight: ClassWeight::BalancedSubsample,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Set the number of trees
    pub fn with_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fitted random forest classifier.
///
/// Class labels are kept in ascending order; column `k` of
/// [`RandomForest::predict_proba`] is the probability of `classes()[k]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    classes: Vec<usize>,
    n_features: usize,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fit on `x` (rows × features) and labels `y`.
    pub fn fit(config: ForestConfig, x: &Array2<f64>, y: &[usize]) -> Result<Self> {
        let (n_samples, n_features) = x.dim();
        if y.len() != n_samples {
            return Err(FusionarError::LengthMismatch {
                column: "labels".to_string(),
                expected: n_samples,
                actual: y.len(),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(FusionarError::EmptyDataset {
                message: format!("cannot fit on a {n_samples}x{n_features} matrix"),
            });
        }
        if config.n_estimators == 0 {
            return Err(FusionarError::ConfigValue {
                field: "n_estimators".to_string(),
                message: "must be at least 1".to_string(),
                suggestion: "Pass --trees with a positive value".to_string(),
            });
        }

        let classes: Vec<usize> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();

        let params = TreeParams {
            max_features: config.max_features.resolve(n_features),
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.n_estimators).map(|_| rng.random()).collect();

        tracing::debug!(
            trees = config.n_estimators,
            samples = n_samples,
            features = n_features,
            max_features = params.max_features,
            "fitting forest"
        );

        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| fit_tree(&config, &params, x.view(), &encoded, classes.len(), seed))
            .collect();

        let feature_importances = average_importances(&trees, n_features);

        Ok(Self {
            config,
            classes,
            n_features,
            trees,
            feature_importances,
        })
    }

    /// Class labels seen during fitting, ascending
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Number of features the model expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fitted trees
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Hyperparameters used for fitting
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Mean decrease in impurity per feature, summing to one
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Mean class distribution over trees, `(rows, classes)`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;
        let n_classes = self.classes.len();
        let rows: Vec<Vec<f64>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mut acc = vec![0.0; n_classes];
                for tree in &self.trees {
                    for (a, p) in acc.iter_mut().zip(tree.predict_row(row)) {
                        *a += p;
                    }
                }
                let n = self.trees.len() as f64;
                acc.into_iter().map(|a| a / n).collect()
            })
            .collect();

        Ok(Array2::from_shape_fn((x.nrows(), n_classes), |(i, k)| rows[i][k]))
    }

    /// Most probable class label per row (lowest label on ties)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (k, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = k;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    /// Fraction of rows whose predicted label equals `y`
    pub fn score(&self, x: &Array2<f64>, y: &[usize]) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(accuracy(&predictions, y))
    }

    /// Fail when a matrix does not have the fitted width
    pub fn check_width(&self, n_features: usize) -> Result<()> {
        if n_features != self.n_features {
            return Err(FusionarError::ShapeMismatch {
                expected: self.n_features,
                actual: n_features,
            });
        }
        Ok(())
    }
}

/// Share of equal entries; 0 for empty input.
pub fn accuracy(predictions: &[usize], truth: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / truth.len() as f64
}

fn fit_tree(
    config: &ForestConfig,
    params: &TreeParams,
    x: ArrayView2<'_, f64>,
    y: &[usize],
    n_classes: usize,
    seed: u64,
) -> DecisionTree {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = y.len();

    let mut counts = vec![0.0; n];
    if config.bootstrap {
        for _ in 0..n {
            counts[rng.random_range(0..n)] += 1.0;
        }
    } else {
        counts.iter_mut().for_each(|c| *c = 1.0);
    }

    let weights: Vec<f64> = match config.class_weight {
        ClassWeight::Uniform => counts,
        ClassWeight::BalancedSubsample => {
            let class_weights = balanced_weights(&counts, y, n_classes);
            counts
                .iter()
                .zip(y)
                .map(|(c, &label)| c * class_weights[label])
                .collect()
        }
    };

    DecisionTree::fit(x, y, &weights, n_classes, params, rng.random())
}

/// `n / (k · n_c)` over the classes present in the sample; absent classes get 0.
fn balanced_weights(counts: &[f64], y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut per_class = vec![0.0; n_classes];
    for (c, &label) in counts.iter().zip(y) {
        per_class[label] += c;
    }
    let total: f64 = per_class.iter().sum();
    let present = per_class.iter().filter(|&&c| c > 0.0).count() as f64;
    per_class
        .iter()
        .map(|&c| if c > 0.0 { total / (present * c) } else { 0.0 })
        .collect()
}

/// Average the per-tree normalized importances of trees that split at least once.
fn average_importances(trees: &[DecisionTree], n_features: usize) -> Vec<f64> {
    let mut sum = vec![0.0; n_features];
    let mut used = 0usize;
    for tree in trees.iter().filter(|t| t.node_count() > 1) {
        for (s, v) in sum.iter_mut().zip(tree.feature_importances()) {
            *s += v;
        }
        used += 1;
    }
    if used == 0 {
        return sum;
    }
    let total: f64 = sum.iter().sum();
    if total > 0.0 {
        sum.iter_mut().for_each(|s| *s /= total);
    }
    sum
}
