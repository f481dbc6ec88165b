//! API module for the Riskwise service
//!
//! This module contains all API-related functionality.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure;
