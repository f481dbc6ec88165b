//! Riskwise patient risk service library
//!
//! This module exports the HTTP layer, the shared model state and the
//! configuration of the Riskwise service.

pub mod api;
pub mod core;
pub mod error;
pub mod models;

pub use crate::core::RiskService;
pub use error::ApiError;

/// Application configuration
pub mod config {
    use std::path::PathBuf;

    use ml::{ForestParams, TrainingConfig};
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub model: ModelConfig,
        pub log: LogConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        pub workers: Option<usize>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ModelConfig {
        pub artifact_path: PathBuf,
        pub n_trees: usize,
        pub max_depth: usize,
        pub seed: u64,
        pub test_fraction: f64,
        pub min_patients: usize,
    }

    impl ModelConfig {
        pub fn training_config(&self) -> TrainingConfig {
            TrainingConfig {
                forest: ForestParams {
                    n_trees: self.n_trees,
                    max_depth: self.max_depth,
                    seed: self.seed,
                },
                test_fraction: self.test_fraction,
                split_seed: self.seed,
                min_patients: self.min_patients,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LogConfig {
        pub json: bool,
    }

    /// Load configuration: built-in defaults, then `config/default`, then
    /// `config/{RISKWISE_ENV}`, then `RISKWISE__*` environment variables.
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("RISKWISE_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000_i64)?
            .set_default("model.artifact_path", ml::artifact::DEFAULT_ARTIFACT_PATH)?
            .set_default("model.n_trees", 100_i64)?
            .set_default("model.max_depth", 10_i64)?
            .set_default("model.seed", 42_i64)?
            .set_default("model.test_fraction", 0.2_f64)?
            .set_default("model.min_patients", ml::training::MIN_TRAINING_PATIENTS as i64)?
            .set_default("log.json", false)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("RISKWISE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
