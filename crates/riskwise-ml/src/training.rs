//! Training pipeline: features, seeded hold-out split, ensemble fit and the
//! statistics reported back to callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MlError, Result};
use crate::features::{build_features, FeatureTable};
use crate::forest::{ForestParams, RiskForest};
use crate::patient::PatientRecord;

pub const MIN_TRAINING_PATIENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub forest: ForestParams,
    pub test_fraction: f64,
    pub split_seed: u64,
    pub min_patients: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            test_fraction: 0.2,
            split_seed: 42,
            min_patients: MIN_TRAINING_PATIENTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatistics {
    pub total_patients_trained: usize,
    pub model_accuracy: f64,
    pub last_trained_date: DateTime<Utc>,
    pub features: Vec<String>,
    pub feature_importance: BTreeMap<String, f64>,
}

/// A fitted ensemble together with the columns it was fit on and the
/// statistics computed when it was trained.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    pub forest: RiskForest,
    pub feature_names: Vec<String>,
    pub statistics: ModelStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with a fixed seed and holds out `ceil(n * test_fraction)`
/// rows, always leaving at least one row on each side when `n >= 2`.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut n_test = (n as f64 * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    }
    let train = indices.split_off(n_test.min(n));
    Split {
        train,
        test: indices,
    }
}

pub fn train(patients: &[PatientRecord], config: &TrainingConfig) -> Result<TrainedModel> {
    if patients.len() < config.min_patients {
        return Err(MlError::InsufficientData {
            required: config.min_patients,
            supplied: patients.len(),
        });
    }

    let FeatureTable { records, labels } = build_features(patients);
    let labels = labels.ok_or(MlError::MissingLabels)?;

    let split = train_test_split(records.nrows(), config.test_fraction, config.split_seed);
    let x_train = records.select(Axis(0), &split.train);
    let y_train = labels.select(Axis(0), &split.train);
    let x_test = records.select(Axis(0), &split.test);
    let y_test = labels.select(Axis(0), &split.test);

    let forest = RiskForest::fit(&x_train, &y_train, &config.forest)?;

    let predicted = forest.predict(&x_test);
    let correct = predicted.iter().zip(y_test.iter()).filter(|(p, y)| p == y).count();
    let accuracy = if split.test.is_empty() {
        0.0
    } else {
        correct as f64 / split.test.len() as f64
    };

    let feature_names = FeatureTable::feature_names();
    let feature_importance = feature_names
        .iter()
        .cloned()
        .zip(forest.feature_importance())
        .collect();

    let statistics = ModelStatistics {
        total_patients_trained: patients.len(),
        model_accuracy: accuracy,
        last_trained_date: Utc::now(),
        features: feature_names.clone(),
        feature_importance,
    };

    info!(
        patients = patients.len(),
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        accuracy,
        "trained risk model"
    );

    Ok(TrainedModel {
        forest,
        feature_names,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::RiskLevel;

    fn cohort(n: usize) -> Vec<PatientRecord> {
        (0..n)
            .map(|i| {
                let age = 18.0 + (i * 7 % 70) as f64;
                let risk = match age {
                    a if a > 60.0 => RiskLevel::High,
                    a if a > 40.0 => RiskLevel::Medium,
                    _ => RiskLevel::Low,
                };
                PatientRecord::new(i as u64, format!("Patient {i}"), age, risk)
            })
            .collect()
    }

    #[test]
    fn split_holds_out_twenty_percent() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn split_rounds_the_test_share_up() {
        assert_eq!(train_test_split(11, 0.2, 42).test.len(), 3);
        assert_eq!(train_test_split(23, 0.2, 42).test.len(), 5);
    }

    #[test]
    fn split_is_deterministic() {
        assert_eq!(train_test_split(40, 0.2, 42), train_test_split(40, 0.2, 42));
    }

    #[test]
    fn refuses_small_cohorts_before_fitting() {
        let err = train(&cohort(9), &TrainingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MlError::InsufficientData { required: 10, supplied: 9 }
        ));
        assert_eq!(
            err.to_string(),
            "Insufficient data. Need at least 10 patients to train model."
        );
    }

    #[test]
    fn insufficient_data_message_names_the_configured_minimum() {
        let config = TrainingConfig {
            min_patients: 12,
            ..TrainingConfig::default()
        };
        let err = train(&cohort(11), &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient data. Need at least 12 patients to train model."
        );
    }

    #[test]
    fn unlabelled_records_fail_training() {
        let mut patients = cohort(12);
        patients[3].risk_level = None;
        assert!(matches!(
            train(&patients, &TrainingConfig::default()),
            Err(MlError::MissingLabels)
        ));
    }

    #[test]
    fn statistics_describe_the_fit() {
        let model = train(&cohort(30), &TrainingConfig::default()).unwrap();
        let stats = &model.statistics;

        assert_eq!(stats.total_patients_trained, 30);
        assert!((0.0..=1.0).contains(&stats.model_accuracy));
        assert_eq!(stats.features, vec!["age", "age_group", "risk_encoded"]);
        assert_eq!(stats.feature_importance.len(), 3);
        let total: f64 = stats.feature_importance.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn retraining_identical_input_reports_identical_accuracy() {
        let patients = cohort(25);
        let first = train(&patients, &TrainingConfig::default()).unwrap();
        let second = train(&patients, &TrainingConfig::default()).unwrap();

        assert_eq!(
            first.statistics.model_accuracy,
            second.statistics.model_accuracy
        );
        assert_eq!(
            first.statistics.feature_importance,
            second.statistics.feature_importance
        );
    }

    #[test]
    fn statistics_serialize_in_camel_case() {
        let model = train(&cohort(10), &TrainingConfig::default()).unwrap();
        let json = serde_json::to_value(&model.statistics).unwrap();
        for key in [
            "totalPatientsTrained",
            "modelAccuracy",
            "lastTrainedDate",
            "features",
            "featureImportance",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
