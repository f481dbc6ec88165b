//! Riskwise machine-learning core
//!
//! Feature engineering, the tree-ensemble classifier, training statistics and
//! the explanation rules shared by the HTTP service and the CLI.

pub mod artifact;
pub mod error;
pub mod explain;
pub mod features;
pub mod forest;
pub mod patient;
pub mod training;

pub use error::MlError;
pub use explain::PredictionResult;
pub use features::{build_features, FeatureTable, FEATURE_NAMES};
pub use forest::{ForestParams, RiskForest};
pub use patient::{PatientRecord, RiskLevel};
pub use training::{train, ModelStatistics, TrainedModel, TrainingConfig};
