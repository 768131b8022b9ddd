//! Weighted CART classification tree
//!
//! Nodes live in a flat arena with the root at index 0. Leaves hold the
//! normalized weighted class distribution; every node records its cover
//! (weighted sample mass), which the attribution explainer relies on.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Minimum gap between two feature values for a threshold to sit between them
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Impurity at or below which a node is considered pure
const PURE: f64 = 1e-12;

/// A node of the tree arena
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Internal node: rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    /// Terminal node with class probabilities
    Leaf { value: Vec<f64>, cover: f64 },
}

impl Node {
    /// Weighted training mass that reached this node
    pub fn cover(&self) -> f64 {
        match self {
            Self::Split { cover, .. } | Self::Leaf { cover, .. } => *cover,
        }
    }
}

/// Growth limits for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeParams {
    /// Candidate features drawn per split
    pub max_features: usize,
    /// Depth limit; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum rows required to split a node
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_features: usize::MAX,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Fitted classification tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
    /// Unnormalized weighted impurity decrease per feature
    #[serde(default)]
    impurity_decrease: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` with positive `weights`.
    ///
    /// `y` holds class indices in `0..n_classes`; `weights` combines bootstrap
    /// multiplicity with class weighting.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: &TreeParams,
        seed: u64,
    ) -> Self {
        let n_features = x.ncols();
        let mut tree = Self {
            nodes: vec![Node::Leaf {
                value: vec![0.0; n_classes],
                cover: 0.0,
            }],
            n_features,
            n_classes,
            impurity_decrease: vec![0.0; n_features],
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut feature_order: Vec<usize> = (0..n_features).collect();
        let samples: Vec<usize> = (0..x.nrows()).filter(|&i| weights[i] > 0.0).collect();
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((slot, samples, depth)) = stack.pop() {
            let counts = class_counts(&samples, y, weights, n_classes);
            let cover: f64 = counts.iter().sum();
            let impurity = gini(&counts, cover);

            let can_split = samples.len() >= params.min_samples_split.max(2)
                && impurity > PURE
                && params.max_depth.map_or(true, |d| depth < d);

            let best = if can_split {
                feature_order.shuffle(&mut rng);
                best_split(x, y, weights, &samples, &counts, &feature_order, params.max_features)
            } else {
                None
            };

            let Some(best) = best else {
                tree.nodes[slot] = Node::Leaf {
                    value: normalize(counts, cover),
                    cover,
                };
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&i| x[[i, best.feature]] <= best.threshold);

            tree.impurity_decrease[best.feature] += cover * impurity - best.score;

            let left_slot = tree.push_placeholder();
            let right_slot = tree.push_placeholder();
            tree.nodes[slot] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left: left_slot,
                right: right_slot,
                cover,
            };
            stack.push((right_slot, right, depth + 1));
            stack.push((left_slot, left, depth + 1));
        }

        tree
    }

    fn push_placeholder(&mut self) -> usize {
        self.nodes.push(Node::Leaf {
            value: Vec::new(),
            cover: 0.0,
        });
        self.nodes.len() - 1
    }

    /// Node arena, root first
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of input features
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes in every leaf distribution
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum root-to-leaf depth
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
            }
        }
        max_depth
    }

    /// Index of the leaf reached by `row`
    pub fn leaf_index(&self, row: ArrayView1<'_, f64>) -> usize {
        let mut idx = 0;
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = &self.nodes[idx]
        {
            idx = if row[*feature] <= *threshold { *left } else { *right };
        }
        idx
    }

    /// Class distribution of the leaf reached by `row`
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        match &self.nodes[self.leaf_index(row)] {
            Node::Leaf { value, .. } => value,
            Node::Split { .. } => unreachable!("leaf_index always stops at a leaf"),
        }
    }

    /// Impurity-based importances normalized to sum to one (all zeros for a stump).
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.n_features];
        }
        self.impurity_decrease.iter().map(|v| v / total).collect()
    }
}

fn class_counts(samples: &[usize], y: &[usize], weights: &[f64], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &i in samples {
        counts[y[i]] += weights[i];
    }
    counts
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

fn normalize(counts: Vec<f64>, total: f64) -> Vec<f64> {
    if total <= 0.0 {
        return counts;
    }
    counts.into_iter().map(|c| c / total).collect()
}

/// Best Gini split over up to `max_features` non-constant features.
///
/// Features are visited in `order`; constant features do not count against
/// the budget.
fn best_split(
    x: ArrayView2<'_, f64>,
    y: &[usize],
    weights: &[f64],
    samples: &[usize],
    totals: &[f64],
    order: &[usize],
    max_features: usize,
) -> Option<BestSplit> {
    let total_weight: f64 = totals.iter().sum();
    let mut best: Option<BestSplit> = None;
    let mut visited = 0;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(samples.len());
    let mut left = vec![0.0; totals.len()];
    let mut right = vec![0.0; totals.len()];

    for &feature in order {
        if visited >= max_features {
            break;
        }

        sorted.clear();
        sorted.extend(samples.iter().map(|&i| (x[[i, feature]], i)));
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (lo, hi) = (sorted[0].0, sorted[sorted.len() - 1].0);
        if hi <= lo + FEATURE_THRESHOLD {
            continue;
        }
        visited += 1;

        left.iter_mut().for_each(|c| *c = 0.0);
        let mut left_weight = 0.0;

        for pos in 0..sorted.len() - 1 {
            let (value, i) = sorted[pos];
            left[y[i]] += weights[i];
            left_weight += weights[i];

            let next = sorted[pos + 1].0;
            if next <= value + FEATURE_THRESHOLD {
                continue;
            }

            let right_weight = total_weight - left_weight;
            for (r, (t, l)) in right.iter_mut().zip(totals.iter().zip(left.iter())) {
                *r = t - l;
            }
            let score =
                left_weight * gini(&left, left_weight) + right_weight * gini(&right, right_weight);

            if best.as_ref().map_or(true, |b| score < b.score) {
                let mut threshold = value / 2.0 + next / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}
