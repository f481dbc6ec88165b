use actix_web::web;

use super::handlers;

/// Mounts the ML endpoints under `/api/ml` plus a liveness probe.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/ml")
            .route("/train", web::post().to(handlers::train))
            .route("/predict", web::post().to(handlers::predict))
            .route("/model-info", web::get().to(handlers::model_info)),
    )
    .route("/health", web::get().to(handlers::health));
}
