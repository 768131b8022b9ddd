//! Feature derivation, enrichment and model-input selection
//!
//! - `builder`: labeled pull-request features from the loaded record sets
//! - `merge`: author and repository enrichment
//! - `select`: candidate features and the dense model matrix
//! - `export`: CSV export of the merged table

mod aggregate;
pub mod builder;
mod export;
pub mod merge;
mod select;

pub use builder::{build_features, PrKeys, AGENT_PREFIX, KEY_CANDIDATES, LABEL};
pub use export::{export_columns, write_feature_csv};
pub use merge::{left_join, merge_with_user_repo};
pub use select::{feature_matrix, label_vector, select_features, CANDIDATE_FEATURES};
