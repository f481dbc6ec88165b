//! Wire types of the Riskwise HTTP API.

pub mod patient;

pub use patient::{HealthStatus, PatientBatch};
