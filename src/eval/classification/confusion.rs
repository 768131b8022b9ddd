//! Confusion matrix over an explicit label set

use std::collections::BTreeSet;
use std::fmt;

/// Confusion matrix for single-label classification.
///
/// Row `i` / column `j` counts samples whose true label is `labels()[i]` and
/// whose predicted label is `labels()[j]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    labels: Vec<usize>,
}

impl ConfusionMatrix {
    /// Build from ground truth and predictions.
    ///
    /// The label set is the sorted union of both inputs.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Self {
        let labels: Vec<usize> = y_true
            .iter()
            .chain(y_pred)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self::with_labels(y_true, y_pred, labels)
    }

    /// Build over a fixed label set; pairs with an unknown label are skipped.
    pub fn with_labels(y_true: &[usize], y_pred: &[usize], labels: Vec<usize>) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len(), "truth and predictions differ in length");
        let k = labels.len();
        let mut matrix = vec![vec![0; k]; k];
        let position = |label: usize| labels.binary_search(&label).ok();

        for (&t, &p) in y_true.iter().zip(y_pred) {
            if let (Some(i), Some(j)) = (position(t), position(p)) {
                matrix[i][j] += 1;
            }
        }
        Self { matrix, labels }
    }

    /// Raw counts
    pub fn matrix(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Label of each row/column
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of classes
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Count at (true position, predicted position)
    pub fn get(&self, true_pos: usize, pred_pos: usize) -> usize {
        self.matrix[true_pos][pred_pos]
    }

    /// True positives for the class at `pos`
    pub fn true_positives(&self, pos: usize) -> usize {
        self.matrix[pos][pos]
    }

    /// Predicted as the class at `pos` but labelled otherwise
    pub fn false_positives(&self, pos: usize) -> usize {
        (0..self.n_classes())
            .filter(|&i| i != pos)
            .map(|i| self.matrix[i][pos])
            .sum()
    }

    /// Labelled as the class at `pos` but predicted otherwise
    pub fn false_negatives(&self, pos: usize) -> usize {
        (0..self.n_classes())
            .filter(|&j| j != pos)
            .map(|j| self.matrix[pos][j])
            .sum()
    }

    /// True instances of the class at `pos`
    pub fn support(&self, pos: usize) -> usize {
        self.matrix[pos].iter().sum()
    }

    /// Number of counted samples
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Share of samples on the diagonal; 0 when empty.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{:>8}", "")?;
        for label in &self.labels {
            write!(f, "{:>8}", format!("Pred {label}"))?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "{:>8}", format!("True {label}"))?;
            for count in row {
                write!(f, "{count:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
