//! Error taxonomy of the HTTP surface.
//!
//! Every failure leaves the service as `{"error": "<message>"}` with a status
//! code that reflects who is at fault.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ml::MlError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Insufficient data. Need at least {required} patients to train model.")]
    InsufficientData { required: usize },

    #[error("Model not trained. Please train the model first.")]
    ModelNotTrained,

    #[error("No model trained yet")]
    NoModel,

    #[error("No patient data provided")]
    NoInput,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_))
    }
}

impl From<MlError> for ApiError {
    fn from(err: MlError) -> Self {
        match err {
            MlError::InsufficientData { required, .. } => ApiError::InsufficientData { required },
            MlError::EmptyInput => ApiError::NoInput,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InsufficientData { .. }
            | ApiError::ModelNotTrained
            | ApiError::NoInput
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoModel => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ApiError::InsufficientData { required: 10 }, 400)]
    #[test_case(ApiError::ModelNotTrained, 400)]
    #[test_case(ApiError::NoInput, 400)]
    #[test_case(ApiError::BadRequest("bad json".into()), 400)]
    #[test_case(ApiError::NoModel, 404)]
    #[test_case(ApiError::Internal("boom".into()), 500)]
    fn maps_to_status(err: ApiError, status: u16) {
        assert_eq!(err.status_code().as_u16(), status);
    }

    #[test]
    fn ml_failures_are_classified() {
        let insufficient: ApiError = MlError::InsufficientData { required: 10, supplied: 3 }.into();
        assert_eq!(
            insufficient.to_string(),
            "Insufficient data. Need at least 10 patients to train model."
        );
        assert!(matches!(ApiError::from(MlError::EmptyInput), ApiError::NoInput));
        assert!(ApiError::from(MlError::MissingLabels).is_internal());
    }
}
