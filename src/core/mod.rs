//! Core module for the Riskwise service
//!
//! This module owns the shared model slot and the operations run against it.

pub mod holder;
pub mod service;
pub mod store;

pub use holder::ModelHolder;
pub use service::RiskService;
pub use store::{FileModelStore, ModelStore};
