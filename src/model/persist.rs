//! Model and feature-list persistence
//!
//! The forest is stored as JSON next to a one-column CSV holding the ordered
//! feature names; both are needed to score new rows. The JSON also records
//! the settings that selected the training rows, so the held-out partition
//! can be rebuilt exactly.

use super::forest::RandomForest;
use crate::error::{FusionarError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// File name of the persisted forest
pub const MODEL_FILE: &str = "model_rf.json";

/// File name of the persisted feature list
pub const FEATURES_FILE: &str = "model_features.csv";

/// Current on-disk format version
const FORMAT_VERSION: u32 = 2;

/// Row selection and partitioning used when the forest was fitted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Seed of the train/test split
    pub seed: u64,
    /// Held-out share of rows
    pub test_fraction: f64,
    /// Agent filter applied before splitting
    #[serde(default)]
    pub agent: Option<String>,
    /// Whether `agent_*` indicators were model inputs
    pub include_agents: bool,
}

/// A forest together with the split it was fitted on
#[derive(Clone, Debug, PartialEq)]
pub struct SavedModel {
    /// Fitted forest
    pub model: RandomForest,
    /// Settings that reproduce its training partition
    pub split: SplitSettings,
}

#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    format_version: u32,
    split: &'a SplitSettings,
    model: &'a RandomForest,
}

#[derive(Deserialize)]
struct ModelArtifact {
    format_version: u32,
    #[serde(default)]
    split: Option<SplitSettings>,
    model: RandomForest,
}

#[derive(Serialize)]
struct FeatureRowRef<'a> {
    feature: &'a str,
}

#[derive(Deserialize)]
struct FeatureRow {
    feature: String,
}

/// Write the forest and its split settings as JSON.
pub fn save_model(model: &RandomForest, split: &SplitSettings, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| FusionarError::io(format!("creating {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    let artifact = ModelArtifactRef {
        format_version: FORMAT_VERSION,
        split,
        model,
    };
    serde_json::to_writer(&mut writer, &artifact)
        .map_err(|e| FusionarError::serialization(format!("JSON serialization failed: {e}")))?;
    writer
        .flush()
        .map_err(|e| FusionarError::io(format!("writing {}", path.display()), e))
}

/// Read a forest written by [`save_model`].
pub fn load_model(path: &Path) -> Result<SavedModel> {
    if !path.exists() {
        return Err(FusionarError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }
    let file =
        File::open(path).map_err(|e| FusionarError::io(format!("opening {}", path.display()), e))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| FusionarError::serialization(format!("JSON deserialization failed: {e}")))?;

    if artifact.format_version != FORMAT_VERSION {
        return Err(FusionarError::serialization(format!(
            "unsupported model format version {} (expected {FORMAT_VERSION})",
            artifact.format_version
        )));
    }
    let split = artifact
        .split
        .ok_or_else(|| FusionarError::serialization("model artifact has no split settings"))?;
    Ok(SavedModel {
        model: artifact.model,
        split,
    })
}

/// Write the ordered feature names under a `feature` header.
pub fn save_feature_list(features: &[String], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(FusionarError::serialization)?;
    for feature in features {
        writer
            .serialize(FeatureRowRef { feature })
            .map_err(FusionarError::serialization)?;
    }
    writer
        .flush()
        .map_err(|e| FusionarError::io(format!("writing {}", path.display()), e))
}

/// Read a feature list written by [`save_feature_list`].
pub fn load_feature_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(FusionarError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path).map_err(FusionarError::serialization)?;
    reader
        .deserialize::<FeatureRow>()
        .map(|row| row.map(|r| r.feature).map_err(FusionarError::serialization))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForestConfig;
    use ndarray::array;
    use tempfile::TempDir;

    fn settings() -> SplitSettings {
        SplitSettings {
            seed: 7,
            test_fraction: 0.25,
            agent: Some("Devin".to_string()),
            include_agents: false,
        }
    }

    #[test]
    fn test_model_round_trip_keeps_predictions() {
        let x = array![[0.0, 1.0], [1.0, 0.5], [2.0, 0.1], [3.0, 0.7], [4.0, 0.2], [5.0, 0.9]];
        let y = [0, 0, 0, 1, 1, 1];
        let model = RandomForest::fit(ForestConfig::default().with_estimators(10), &x, &y).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE);
        save_model(&model, &settings(), &path).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded.split, settings());
        assert_eq!(loaded.model, model);
        assert_eq!(
            loaded.model.predict_proba(&x).unwrap(),
            model.predict_proba(&x).unwrap()
        );
    }

    #[test]
    fn test_feature_list_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FEATURES_FILE);
        let features = vec!["title_length".to_string(), "agent_Devin".to_string()];

        save_feature_list(&features, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "feature\ntitle_length\nagent_Devin\n"
        );
        assert_eq!(load_feature_list(&path).unwrap(), features);
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = TempDir::new().unwrap();
        let err = load_model(&dir.path().join(MODEL_FILE)).unwrap_err();
        assert!(matches!(err, FusionarError::ModelNotFound { .. }));
        let err = load_feature_list(&dir.path().join(FEATURES_FILE)).unwrap_err();
        assert!(matches!(err, FusionarError::ModelNotFound { .. }));
    }

    #[test]
    fn test_older_format_is_rejected() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let config = ForestConfig::default().with_estimators(2);
        let model = RandomForest::fit(config, &x, &[0, 0, 1, 1]).unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE);
        let legacy = serde_json::json!({
            "format_version": 1,
            "model": model,
        });
        std::fs::write(&path, legacy.to_string()).unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(err.to_string().contains("format version 1"), "{err}");
    }

    #[test]
    fn test_corrupt_model_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE);
        std::fs::write(&path, "{not json").unwrap();
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, FusionarError::Serialization { .. }));
    }
}
