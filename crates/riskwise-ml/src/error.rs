use thiserror::Error;

/// Failures raised while building features, fitting or running the classifier.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Insufficient data. Need at least {required} patients to train model.")]
    InsufficientData { required: usize, supplied: usize },

    #[error("every training record must carry a riskLevel")]
    MissingLabels,

    #[error("patient record at index {index} is missing '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("No patient data provided")]
    EmptyInput,

    #[error("failed to fit classifier: {0}")]
    Fit(String),

    #[error("model artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T, E = MlError> = std::result::Result<T, E>;
