//! Request handlers.
//!
//! Fitting and inference are CPU-bound, so both run on actix's blocking pool;
//! the request still waits for them to finish.

use actix_web::{web, HttpResponse};

use crate::core::RiskService;
use crate::error::ApiError;
use crate::models::{HealthStatus, PatientBatch};

pub async fn train(
    service: web::Data<RiskService>,
    body: web::Json<PatientBatch>,
) -> Result<HttpResponse, ApiError> {
    let patients = body.into_inner().patients;
    let statistics = web::block(move || service.train(&patients))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(statistics))
}

pub async fn predict(
    service: web::Data<RiskService>,
    body: web::Json<PatientBatch>,
) -> Result<HttpResponse, ApiError> {
    let patients = body.into_inner().patients;
    let results = web::block(move || service.predict(&patients))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(results))
}

pub async fn model_info(service: web::Data<RiskService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.model_info()?))
}

pub async fn health(service: web::Data<RiskService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus::ok(service.is_trained()))
}
