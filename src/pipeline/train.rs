//! Training stage: fit the forest, report held-out metrics, persist artifacts

use super::dataset::Dataset;
use crate::config::PipelineConfig;
use crate::error::{FusionarError, Result};
use crate::eval::{classification_report, rank_importances, FeatureImportance};
use crate::model::{
    accuracy, save_feature_list, save_model, RandomForest, FEATURES_FILE, MODEL_FILE,
};
use std::fs;
use std::path::PathBuf;

/// What a training run produced
#[derive(Clone, Debug)]
pub struct TrainOutcome {
    /// Model inputs in column order
    pub features: Vec<String>,
    /// Training rows
    pub n_train: usize,
    /// Held-out rows
    pub n_test: usize,
    /// Held-out accuracy
    pub accuracy: f64,
    /// Held-out classification report
    pub report: String,
    /// Impurity importances, largest first
    pub importances: Vec<FeatureImportance>,
    /// Persisted forest
    pub model_path: PathBuf,
    /// Persisted feature list
    pub features_path: PathBuf,
}

/// Run the training stage end to end.
pub fn train(config: &PipelineConfig) -> Result<TrainOutcome> {
    let data = Dataset::build(config, config.include_agents)?;
    let (x_train, y_train) = data.train();
    let (x_test, y_test) = data.test();
    tracing::info!(
        train = y_train.len(),
        test = y_test.len(),
        features = data.features.len(),
        trees = config.n_estimators,
        "fitting random forest"
    );

    let model = RandomForest::fit(config.forest_config(), &x_train, &y_train)?;
    let y_pred = model.predict(&x_test)?;
    let report = classification_report(&y_test, &y_pred, None, config.report_digits);
    let importances = rank_importances(&data.features, model.feature_importances());

    fs::create_dir_all(&config.artifacts_dir).map_err(|e| {
        FusionarError::io(
            format!("creating {}", config.artifacts_dir.display()),
            e,
        )
    })?;
    let model_path = config.artifact(MODEL_FILE);
    let features_path = config.artifact(FEATURES_FILE);
    save_model(&model, &config.split_settings(), &model_path)?;
    save_feature_list(&data.features, &features_path)?;

    Ok(TrainOutcome {
        n_train: y_train.len(),
        n_test: y_test.len(),
        accuracy: accuracy(&y_pred, &y_test),
        features: data.features,
        report,
        importances,
        model_path,
        features_path,
    })
}
