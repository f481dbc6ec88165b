//! Feature builder: patient records to the fixed-width numeric table the
//! classifier is fit on.

use ndarray::{Array1, Array2};

use crate::patient::{PatientRecord, RiskLevel};

/// Column order of every feature table.
pub const FEATURE_NAMES: [&str; 3] = ["age", "age_group", "risk_encoded"];

/// Upper bounds of the half-open age buckets `(0,30]`, `(30,50]`, `(50,70]`, `(70,100]`.
const AGE_BREAKPOINTS: [f64; 5] = [0.0, 30.0, 50.0, 70.0, 100.0];

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub records: Array2<f64>,
    /// Present only when every record states a risk level.
    pub labels: Option<Array1<usize>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.records.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.records.nrows() == 0
    }

    pub fn feature_names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
    }
}

/// Bucket index for an age; anything outside `(0, 100]` or missing is 0.
pub fn age_group(age: Option<f64>) -> usize {
    let Some(age) = age else { return 0 };
    AGE_BREAKPOINTS
        .windows(2)
        .position(|bounds| age > bounds[0] && age <= bounds[1])
        .unwrap_or(0)
}

/// `Low → 0`, `Medium → 1`, `High → 2`, anything else 0.
pub fn encode_risk(level: Option<&str>) -> usize {
    level
        .and_then(RiskLevel::parse)
        .map(RiskLevel::class_index)
        .unwrap_or(0)
}

pub fn build_features(patients: &[PatientRecord]) -> FeatureTable {
    let mut records = Array2::<f64>::zeros((patients.len(), FEATURE_NAMES.len()));
    let mut encoded = Vec::with_capacity(patients.len());

    for (mut row, patient) in records.outer_iter_mut().zip(patients) {
        let risk = encode_risk(patient.risk_level.as_deref());
        row[0] = patient.age.unwrap_or(0.0);
        row[1] = age_group(patient.age) as f64;
        row[2] = risk as f64;
        encoded.push(risk);
    }

    let labelled = patients.iter().all(|p| p.risk_level.is_some());
    FeatureTable {
        records,
        labels: labelled.then(|| Array1::from(encoded)),
    }
}
