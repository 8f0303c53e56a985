//! Scoring library for the credit scorer service
//!
//! This crate provides:
//! - The wire schema for scoring and feedback requests
//! - The resident credit risk model (load, predict, retrain)
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod model;
pub mod observability;
pub mod schema;

pub use error::{ModelError, ModelResult};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use model::{CreditModel, ModelConfig, ModelInfo, Prediction, ResidentModel, RetrainSummary};
pub use observability::{ScorerMetrics, StructuredLogger};
pub use schema::*;
