//! Patient records as they arrive from the front-end.
//!
//! Deserialization never rejects a record for a malformed value: a field that
//! cannot be read is treated as absent and the feature builder falls back to 0.
//! A list entry that is not an object at all reads as a record with every
//! field absent.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Class order used by the classifier: `Low = 0`, `Medium = 1`, `High = 2`.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn class_index(self) -> usize {
        self as usize
    }

    pub fn from_class(class: usize) -> Option<Self> {
        Self::ALL.get(class).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Echoed back verbatim; the front-end sends either strings or numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    /// Raw stated risk level. Kept as text so unknown values still count as present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

impl PatientRecord {
    pub fn new(id: impl Into<Value>, name: impl Into<String>, age: f64, risk: RiskLevel) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            age: Some(age),
            risk_level: Some(risk.as_str().to_string()),
        }
    }

    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.as_deref().and_then(RiskLevel::parse)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatientFields {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    risk_level: Option<String>,
}

impl<'de> Deserialize<'de> for PatientRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            _ => return Ok(Self::default()),
        };
        let fields = PatientFields::deserialize(Value::Object(map)).map_err(de::Error::custom)?;
        Ok(Self {
            id: fields.id,
            name: fields.name,
            age: fields.age,
            risk_level: fields.risk_level,
        })
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
