//! Random-forest classifier
//!
//! - `tree`: weighted CART trees over a flat node arena
//! - `forest`: bootstrap ensemble with balanced-subsample weighting
//! - `split`: seeded (stratified) train/test partitioning
//! - `persist`: JSON model and CSV feature-list artifacts

mod forest;
mod persist;
mod split;
mod tree;

pub use forest::{accuracy, ClassWeight, ForestConfig, MaxFeatures, RandomForest};
pub use persist::{
    load_feature_list, load_model, save_feature_list, save_model, SavedModel, SplitSettings,
    FEATURES_FILE, MODEL_FILE,
};
pub use split::{test_size, train_test_split, TrainTestSplit};
pub use tree::{DecisionTree, Node, TreeParams};
