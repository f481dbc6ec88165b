use std::sync::{Mutex, PoisonError};

use ml::{ModelStatistics, PatientRecord, PredictionResult, TrainingConfig};
use tracing::{error, info, instrument, warn};

use super::holder::ModelHolder;
use super::store::{FileModelStore, ModelStore};
use crate::config::Config;
use crate::error::ApiError;

/// Training, prediction and model-info operations over one shared model slot.
pub struct RiskService {
    holder: ModelHolder,
    store: Box<dyn ModelStore>,
    training: TrainingConfig,
    // Serializes train -> persist -> replace.
    train_lock: Mutex<()>,
}

impl RiskService {
    pub fn new(store: Box<dyn ModelStore>, training: TrainingConfig) -> Self {
        Self {
            holder: ModelHolder::new(),
            store,
            training,
            train_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store = FileModelStore::new(config.model.artifact_path.clone());
        info!(artifact = %store.path().display(), "trained models will be written to disk");
        Self::new(Box::new(store), config.model.training_config())
    }

    pub fn is_trained(&self) -> bool {
        self.holder.is_trained()
    }

    /// Fits a new model, persists it and only then installs it. A failed
    /// save leaves the previously held model in place.
    #[instrument(skip_all, fields(patients = patients.len()))]
    pub fn train(&self, patients: &[PatientRecord]) -> Result<ModelStatistics, ApiError> {
        let _guard = self.train_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let model = ml::train(patients, &self.training).map_err(|e| log_failure(e.into()))?;
        self.store.save(&model).map_err(|e| log_failure(e.into()))?;

        let statistics = model.statistics.clone();
        self.holder.replace(model);
        info!(
            accuracy = statistics.model_accuracy,
            "installed newly trained model"
        );
        Ok(statistics)
    }

    #[instrument(skip_all, fields(patients = patients.len()))]
    pub fn predict(&self, patients: &[PatientRecord]) -> Result<Vec<PredictionResult>, ApiError> {
        let model = self
            .holder
            .current()
            .ok_or_else(|| log_failure(ApiError::ModelNotTrained))?;
        model.predict(patients).map_err(|e| log_failure(e.into()))
    }

    pub fn model_info(&self) -> Result<ModelStatistics, ApiError> {
        self.holder.statistics().ok_or(ApiError::NoModel)
    }
}

fn log_failure(err: ApiError) -> ApiError {
    if err.is_internal() {
        error!(error = %err, "request failed");
    } else {
        warn!(error = %err, "request rejected");
    }
    err
}
