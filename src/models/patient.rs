use serde::{Deserialize, Serialize};

pub use ml::{ModelStatistics, PatientRecord, PredictionResult, RiskLevel};

/// Body of `POST /api/ml/train` and `POST /api/ml/predict`.
/// A missing `patients` key is an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientBatch {
    #[serde(default)]
    pub patients: Vec<PatientRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn ok(model_loaded: bool) -> Self {
        Self {
            status: "ok".to_string(),
            model_loaded,
        }
    }
}
