//! Turns ensemble votes into per-patient results with human-readable
//! justifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MlError, Result};
use crate::features::build_features;
use crate::patient::{PatientRecord, RiskLevel};
use crate::training::TrainedModel;

pub const ADVANCED_AGE: &str = "Advanced age (>60 years)";
pub const CURRENT_HIGH_RISK: &str = "Current high risk status";
pub const AGE_AND_RISK: &str = "Age and risk combination";
pub const NO_SIGNIFICANT_FACTORS: &str = "No significant risk factors identified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub patient_id: Value,
    pub patient_name: String,
    pub predicted_risk: RiskLevel,
    pub confidence: f64,
    pub factors: Vec<String>,
    pub recommendation: String,
}

/// Rules are checked against the raw record, independently and in order.
/// A missing age never satisfies an age threshold.
pub fn risk_factors(patient: &PatientRecord) -> Vec<String> {
    let age = patient.age;
    let stated = patient.risk_level.as_deref();
    let older_than = |years: f64| age.map_or(false, |a| a > years);

    let mut factors = Vec::new();
    if older_than(60.0) {
        factors.push(ADVANCED_AGE.to_string());
    }
    if stated == Some("High") {
        factors.push(CURRENT_HIGH_RISK.to_string());
    }
    if older_than(40.0) && stated != Some("Low") {
        factors.push(AGE_AND_RISK.to_string());
    }

    if factors.is_empty() {
        factors.push(NO_SIGNIFICANT_FACTORS.to_string());
    }
    factors
}

pub fn recommendation(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "Immediate follow-up recommended. Schedule comprehensive evaluation.",
        RiskLevel::Medium => "Monitor closely. Schedule follow-up within 2-4 weeks.",
        RiskLevel::Low => "Continue routine care. Regular check-ups as scheduled.",
    }
}

impl TrainedModel {
    /// One result per patient, in input order. Every record must carry an
    /// `id` and a `name`; those are checked before inference runs.
    pub fn predict(&self, patients: &[PatientRecord]) -> Result<Vec<PredictionResult>> {
        if patients.is_empty() {
            return Err(MlError::EmptyInput);
        }

        let mut labels = Vec::with_capacity(patients.len());
        for (index, patient) in patients.iter().enumerate() {
            let id = match &patient.id {
                Some(id) if !id.is_null() => id.clone(),
                _ => return Err(MlError::MissingField { index, field: "id" }),
            };
            let name = patient
                .name
                .clone()
                .ok_or(MlError::MissingField { index, field: "name" })?;
            labels.push((id, name));
        }

        let table = build_features(patients);
        let votes = self.forest.vote(&table.records);

        let results = patients
            .iter()
            .zip(labels)
            .zip(votes)
            .map(|((patient, (patient_id, patient_name)), vote)| {
                let predicted_risk = RiskLevel::from_class(vote.class).unwrap_or(RiskLevel::Low);
                PredictionResult {
                    patient_id,
                    patient_name,
                    predicted_risk,
                    confidence: vote.confidence,
                    factors: risk_factors(patient),
                    recommendation: recommendation(predicted_risk).to_string(),
                }
            })
            .collect();
        Ok(results)
    }
}
