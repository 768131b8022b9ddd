//! Per-class precision, recall and F1

use super::average::Average;
use super::confusion::ConfusionMatrix;

/// Per-class metrics, indexed like the confusion matrix labels
#[derive(Clone, Debug, PartialEq)]
pub struct MultiClassMetrics {
    /// Class labels
    pub labels: Vec<usize>,
    /// Per-class precision
    pub precision: Vec<f64>,
    /// Per-class recall
    pub recall: Vec<f64>,
    /// Per-class F1 score
    pub f1: Vec<f64>,
    /// Per-class support
    pub support: Vec<usize>,
    /// Overall accuracy
    pub accuracy: f64,
}

impl MultiClassMetrics {
    /// Compute from a confusion matrix. Undefined ratios are 0.
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let n = cm.n_classes();
        let mut precision = Vec::with_capacity(n);
        let mut recall = Vec::with_capacity(n);
        let mut f1 = Vec::with_capacity(n);
        let mut support = Vec::with_capacity(n);

        for pos in 0..n {
            let tp = cm.true_positives(pos) as f64;
            let fp = cm.false_positives(pos) as f64;
            let fn_ = cm.false_negatives(pos) as f64;

            let p = ratio(tp, tp + fp);
            let r = ratio(tp, tp + fn_);
            precision.push(p);
            recall.push(r);
            f1.push(ratio(2.0 * p * r, p + r));
            support.push(cm.support(pos));
        }

        Self {
            labels: cm.labels().to_vec(),
            precision,
            recall,
            f1,
            support,
            accuracy: cm.accuracy(),
        }
    }

    /// Compute from ground truth and predictions
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Self {
        Self::from_confusion_matrix(&ConfusionMatrix::from_predictions(y_true, y_pred))
    }

    /// Number of classes
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Total support
    pub fn total_support(&self) -> usize {
        self.support.iter().sum()
    }

    /// Averaged precision
    pub fn precision_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.precision, average)
    }

    /// Averaged recall
    pub fn recall_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.recall, average)
    }

    /// Averaged F1
    pub fn f1_avg(&self, average: Average) -> f64 {
        self.average_metric(&self.f1, average)
    }

    fn average_metric(&self, values: &[f64], average: Average) -> f64 {
        match average {
            Average::Macro => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            // single-label: global TP / (TP + FP) == TP / (TP + FN) == accuracy
            Average::Micro => self.accuracy,
            Average::Weighted => {
                let total = self.total_support();
                if total == 0 {
                    return 0.0;
                }
                values
                    .iter()
                    .zip(&self.support)
                    .map(|(&v, &s)| v * s as f64)
                    .sum::<f64>()
                    / total as f64
            }
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
