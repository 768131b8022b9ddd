//! Exact path-dependent TreeSHAP for the random forest
//!
//! Attributions follow the polynomial-time path algorithm of Lundberg et al.
//! (2018): each root-to-leaf walk tracks, for every feature on the path, the
//! share of permutations in which it is "present" (one fraction) or
//! "absent" (zero fraction, weighted by node cover). For every row the
//! attributions plus the expected value reproduce the model output exactly.

use crate::error::Result;
use crate::model::{DecisionTree, Node, RandomForest};
use ndarray::{Array2, Array3, ArrayView1, Axis};
use rayon::prelude::*;

#[derive(Clone, Copy, Debug)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Attribution explainer over a fitted forest
pub struct TreeExplainer<'a> {
    model: &'a RandomForest,
}

impl<'a> TreeExplainer<'a> {
    /// Wrap a fitted model
    pub fn new(model: &'a RandomForest) -> Self {
        Self { model }
    }

    /// Cover-weighted mean output per class (the attribution baseline)
    pub fn expected_value(&self) -> Vec<f64> {
        let n_classes = self.model.classes().len();
        let trees = self.model.trees();
        let mut base = vec![0.0; n_classes];
        for tree in trees {
            for (b, v) in base.iter_mut().zip(tree_expected_value(tree)) {
                *b += v;
            }
        }
        base.iter().map(|b| b / trees.len() as f64).collect()
    }

    /// Attributions shaped `(rows, features, classes)`.
    pub fn shap_values(&self, x: &Array2<f64>) -> Result<Array3<f64>> {
        self.model.check_width(x.ncols())?;
        let (n_rows, n_features) = x.dim();
        let n_classes = self.model.classes().len();
        let n_trees = self.model.trees().len() as f64;

        let per_row: Vec<Array2<f64>> = (0..n_rows)
            .into_par_iter()
            .map(|i| {
                let mut phi = Array2::zeros((n_features, n_classes));
                for tree in self.model.trees() {
                    tree_shap(tree, x.row(i), &mut phi);
                }
                phi / n_trees
            })
            .collect();

        let mut out = Array3::zeros((n_rows, n_features, n_classes));
        for (mut slot, phi) in out.outer_iter_mut().zip(per_row) {
            slot.assign(&phi);
        }
        Ok(out)
    }
}

/// Index of the positive class: label 1 when present, the only class when
/// there is one, otherwise the highest label.
pub fn positive_class_index(classes: &[usize]) -> usize {
    classes
        .iter()
        .position(|&c| c == 1)
        .unwrap_or_else(|| classes.len().saturating_sub(1))
}

/// `(rows, features)` slice of the positive class.
pub fn positive_class_values(values: &Array3<f64>, classes: &[usize]) -> Array2<f64> {
    values
        .index_axis(Axis(2), positive_class_index(classes))
        .to_owned()
}

/// Mean absolute attribution per feature (column)
pub fn mean_abs(values: &Array2<f64>) -> Vec<f64> {
    if values.nrows() == 0 {
        return vec![0.0; values.ncols()];
    }
    values
        .columns()
        .into_iter()
        .map(|col| col.iter().map(|v| v.abs()).sum::<f64>() / col.len() as f64)
        .collect()
}

/// Cover-weighted mean of the leaf distributions of one tree
pub fn tree_expected_value(tree: &DecisionTree) -> Vec<f64> {
    let nodes = tree.nodes();
    let root_cover = nodes[0].cover();
    let mut out = vec![0.0; tree.n_classes()];
    for node in nodes {
        if let Node::Leaf { value, cover } = node {
            let w = if root_cover > 0.0 { cover / root_cover } else { 1.0 };
            for (o, v) in out.iter_mut().zip(value) {
                *o += w * v;
            }
        }
    }
    out
}

/// Accumulate one tree's attributions for `row` into `phi` (features × classes).
pub fn tree_shap(tree: &DecisionTree, row: ArrayView1<'_, f64>, phi: &mut Array2<f64>) {
    let path = Vec::with_capacity(tree.depth() + 2);
    recurse(tree.nodes(), row, phi, 0, path, 0, 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    nodes: &[Node],
    row: ArrayView1<'_, f64>,
    phi: &mut Array2<f64>,
    node: usize,
    mut path: Vec<PathElement>,
    mut unique_depth: usize,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, unique_depth, zero_fraction, one_fraction, feature);

    match &nodes[node] {
        Node::Leaf { value, .. } => {
            for i in 1..=unique_depth {
                let w = unwound_path_sum(&path, unique_depth, i);
                let el = path[i];
                let Some(f) = el.feature else { continue };
                let scale = w * (el.one_fraction - el.zero_fraction);
                for (k, v) in value.iter().enumerate() {
                    phi[[f, k]] += scale * v;
                }
            }
        }
        Node::Split {
            feature: split_feature,
            threshold,
            left,
            right,
            cover,
        } => {
            let (hot, cold) = if row[*split_feature] <= *threshold {
                (*left, *right)
            } else {
                (*right, *left)
            };

            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = (1..=unique_depth).find(|&k| path[k].feature == Some(*split_feature)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, unique_depth, k);
                unique_depth -= 1;
            }

            let fraction = |child: usize| {
                if *cover > 0.0 {
                    nodes[child].cover() / cover
                } else {
                    0.5
                }
            };

            recurse(
                nodes,
                row,
                phi,
                hot,
                path.clone(),
                unique_depth + 1,
                fraction(hot) * incoming_zero,
                incoming_one,
                Some(*split_feature),
            );
            recurse(
                nodes,
                row,
                phi,
                cold,
                path,
                unique_depth + 1,
                fraction(cold) * incoming_zero,
                0.0,
                Some(*split_feature),
            );
        }
    }
}

fn extend_path(
    path: &mut Vec<PathElement>,
    unique_depth: usize,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    path.truncate(unique_depth);
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    });

    let d = unique_depth as f64;
    for i in (0..unique_depth).rev() {
        let fi = i as f64;
        path[i + 1].pweight += one_fraction * path[i].pweight * (fi + 1.0) / (d + 1.0);
        path[i].pweight = zero_fraction * path[i].pweight * (d - fi) / (d + 1.0);
    }
}

fn unwind_path(path: &mut [PathElement], unique_depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let d = unique_depth as f64;

    for i in (0..unique_depth).rev() {
        let fi = i as f64;
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * (d + 1.0) / ((fi + 1.0) * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (d - fi) / (d + 1.0);
        } else {
            path[i].pweight = path[i].pweight * (d + 1.0) / (zero_fraction * (d - fi));
        }
    }

    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

fn unwound_path_sum(path: &[PathElement], unique_depth: usize, path_index: usize) -> f64 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let d = unique_depth as f64;
    let mut total = 0.0;

    for i in (0..unique_depth).rev() {
        let fi = i as f64;
        if one_fraction != 0.0 {
            let tmp = next_one_portion * (d + 1.0) / ((fi + 1.0) * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * (d - fi) / (d + 1.0);
        } else if zero_fraction != 0.0 {
            total += path[i].pweight / zero_fraction / ((d - fi) / (d + 1.0));
        }
    }
    total
}
