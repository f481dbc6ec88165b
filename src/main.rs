//! Riskwise service
//!
//! Main entry point for the patient risk classification service.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use riskwise::config::{self, LogConfig};
use riskwise::{api, RiskService};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = config::load_config().context("Failed to load configuration")?;

    // Initialize logger
    init_tracing(&config.log);

    // Create app state
    let service = web::Data::new(RiskService::from_config(&config));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "starting riskwise"
    );

    // Start HTTP server
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(api::middleware::json_config())
            .wrap(api::middleware::cors())
            .wrap(TracingLogger::default())
            .configure(api::configure)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.server.host.as_str(), config.server.port))
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?
        .run()
        .await?;
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
