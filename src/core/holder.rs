use std::sync::{Arc, PoisonError, RwLock};

use ml::{ModelStatistics, TrainedModel};

/// Process-wide slot holding at most one trained model.
///
/// The slot only ever changes by swapping a whole `Arc`, so a poisoned lock
/// still guards a consistent value and is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct ModelHolder {
    slot: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn statistics(&self) -> Option<ModelStatistics> {
        self.current().map(|model| model.statistics.clone())
    }

    pub fn is_trained(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Installs `model`, returning the one it displaced.
    pub fn replace(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml::{train, PatientRecord, RiskLevel, TrainingConfig};

    fn model(n: usize) -> TrainedModel {
        let patients: Vec<PatientRecord> = (0..n)
            .map(|i| {
                let age = 20.0 + 4.0 * i as f64;
                PatientRecord::new(i as u64, format!("P{i}"), age, RiskLevel::ALL[i % 3])
            })
            .collect();
        let config = TrainingConfig {
            forest: ml::ForestParams { n_trees: 5, ..Default::default() },
            ..Default::default()
        };
        train(&patients, &config).unwrap()
    }

    #[test]
    fn starts_empty() {
        let holder = ModelHolder::new();
        assert!(!holder.is_trained());
        assert!(holder.current().is_none());
        assert!(holder.statistics().is_none());
    }

    #[test]
    fn replace_swaps_the_whole_model() {
        let holder = ModelHolder::new();
        assert!(holder.replace(model(10)).is_none());
        assert_eq!(holder.statistics().unwrap().total_patients_trained, 10);

        let held = holder.current().unwrap();
        let previous = holder.replace(model(14)).unwrap();
        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(held.statistics.total_patients_trained, 10);
        assert_eq!(holder.statistics().unwrap().total_patients_trained, 14);
    }
}
