//! Text classification report

use super::average::Average;
use super::confusion::ConfusionMatrix;
use super::metrics::MultiClassMetrics;

/// Confusion matrix from ground truth and predictions
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize]) -> ConfusionMatrix {
    ConfusionMatrix::from_predictions(y_true, y_pred)
}

/// sklearn-layout classification report.
///
/// Rows are named by `target_names` when given (one per label, in label
/// order), otherwise by the label value. Metrics print with `digits` decimals.
///
/// ```ignore
/// let report = classification_report(&[0, 1, 1], &[0, 1, 0], None, 3);
/// assert!(report.contains("weighted avg"));
/// ```
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    target_names: Option<&[&str]>,
    digits: usize,
) -> String {
    let metrics = MultiClassMetrics::from_predictions(y_true, y_pred);
    let names: Vec<String> = match target_names {
        Some(names) if names.len() == metrics.n_classes() => {
            names.iter().map(|s| (*s).to_string()).collect()
        }
        _ => metrics.labels.iter().map(usize::to_string).collect(),
    };

    let width = names
        .iter()
        .map(String::len)
        .chain(["weighted avg".len(), digits])
        .max()
        .unwrap_or(0);

    let metric_row = |name: &str, values: [f64; 3], support: usize| {
        let mut line = format!("{name:>width$} ");
        for v in values {
            line.push_str(&format!(" {v:>9.digits$}"));
        }
        line.push_str(&format!(" {support:>9}\n"));
        line
    };

    let mut report = format!("{:>width$} ", "");
    for header in ["precision", "recall", "f1-score", "support"] {
        report.push_str(&format!(" {header:>9}"));
    }
    report.push_str("\n\n");

    for (pos, name) in names.iter().enumerate() {
        report.push_str(&metric_row(
            name,
            [metrics.precision[pos], metrics.recall[pos], metrics.f1[pos]],
            metrics.support[pos],
        ));
    }
    report.push('\n');

    let total = metrics.total_support();
    report.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.digits$} {total:>9}\n",
        "accuracy", "", "", metrics.accuracy
    ));
    for (name, average) in [("macro avg", Average::Macro), ("weighted avg", Average::Weighted)] {
        report.push_str(&metric_row(
            name,
            [
                metrics.precision_avg(average),
                metrics.recall_avg(average),
                metrics.f1_avg(average),
            ],
            total,
        ));
    }
    report
}
