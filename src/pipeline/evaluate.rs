//! Evaluation stage: reload the forest, score it and explain it
//!
//! Rows are selected and split with the settings stored in the model, and
//! features are rebuilt without agent columns; they must match the persisted
//! list exactly. Attributions are computed on a seeded sample of training
//! rows, permutation importance on the held-out rows.

use super::dataset::Dataset;
use crate::config::PipelineConfig;
use crate::error::{FusionarError, Result};
use crate::eval::{
    classification_report, mean_abs, permutation_importance, positive_class_values,
    rank_importances, render_importance_bar, write_importance_csv, FeatureImportance,
    TreeExplainer,
};
use crate::model::{
    accuracy, load_feature_list, load_model, SavedModel, FEATURES_FILE, MODEL_FILE,
};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Classification report file name
pub const REPORT_FILE: &str = "classification_report.txt";

/// Attribution chart file name
pub const SHAP_CHART_FILE: &str = "shap_summary_bar.svg";

/// Attribution table file name
pub const SHAP_CSV_FILE: &str = "shap_importances.csv";

/// Permutation importance file name
pub const PERMUTATION_FILE: &str = "permutation_importances.csv";

/// Bars drawn on the attribution chart
const CHART_MAX_FEATURES: usize = 20;

/// What an evaluation run produced
#[derive(Clone, Debug)]
pub struct EvaluateOutcome {
    /// Held-out rows scored
    pub n_test: usize,
    /// Training rows explained
    pub n_explained: usize,
    /// Held-out accuracy
    pub accuracy: f64,
    /// Held-out classification report
    pub report: String,
    /// Mean |attribution| of the positive class, largest first
    pub shap: Vec<FeatureImportance>,
    /// Mean accuracy drop under permutation, largest first
    pub permutation: Vec<FeatureImportance>,
    /// Files written, in write order
    pub artifacts: Vec<PathBuf>,
}

/// Run the evaluation stage end to end.
pub fn evaluate(config: &PipelineConfig) -> Result<EvaluateOutcome> {
    let SavedModel { model, split } = load_model(&config.artifact(MODEL_FILE))?;
    let config = &config.with_split(&split);

    let data = Dataset::build(config, false)?;
    let persisted = load_feature_list(&config.artifact(FEATURES_FILE))?;
    if persisted != data.features {
        return Err(FusionarError::FeatureMismatch {
            expected: persisted,
            actual: data.features,
        });
    }
    let mut artifacts = Vec::new();

    let (x_test, y_test) = data.test();
    let y_pred = model.predict(&x_test)?;
    let report = classification_report(&y_test, &y_pred, None, config.report_digits);
    let report_path = config.artifact(REPORT_FILE);
    fs::write(&report_path, &report)
        .map_err(|e| FusionarError::io(format!("writing {}", report_path.display()), e))?;
    artifacts.push(report_path);

    let (x_train, _) = data.train();
    let sample = sample_rows(&x_train, config.shap_sample_size, config.seed);
    tracing::info!(rows = sample.nrows(), "computing tree attributions");
    let values = TreeExplainer::new(&model).shap_values(&sample)?;
    let positive = positive_class_values(&values, model.classes());
    let shap = rank_importances(&data.features, &mean_abs(&positive));

    let chart_rows = &shap[..shap.len().min(CHART_MAX_FEATURES)];
    let chart_path = config.artifact(SHAP_CHART_FILE);
    render_importance_bar(chart_rows, &chart_path)?;
    artifacts.push(chart_path);
    let shap_path = config.artifact(SHAP_CSV_FILE);
    write_importance_csv(&shap, &shap_path)?;
    artifacts.push(shap_path);

    tracing::info!(repeats = config.permutation_repeats, "computing permutation importance");
    let perm = permutation_importance(
        &model,
        &x_test,
        &y_test,
        config.permutation_repeats,
        config.seed,
    )?;
    let permutation = rank_importances(&data.features, &perm.importances_mean);
    let perm_path = config.artifact(PERMUTATION_FILE);
    write_importance_csv(&permutation, &perm_path)?;
    artifacts.push(perm_path);

    Ok(EvaluateOutcome {
        n_test: y_test.len(),
        n_explained: sample.nrows(),
        accuracy: accuracy(&y_pred, &y_test),
        report,
        shap,
        permutation,
        artifacts,
    })
}

/// At most `cap` rows drawn without replacement; all rows when there are fewer.
pub fn sample_rows(x: &Array2<f64>, cap: usize, seed: u64) -> Array2<f64> {
    if x.nrows() <= cap {
        return x.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = rand::seq::index::sample(&mut rng, x.nrows(), cap).into_vec();
    x.select(Axis(0), &rows)
}
