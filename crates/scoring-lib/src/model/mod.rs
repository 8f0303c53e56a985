//! Credit risk model

mod cost;
mod dataset;
mod logistic;
mod resident;

pub use cost::{CostMatrix, DEFAULT_BAD_AS_GOOD_COST, DEFAULT_GOOD_AS_BAD_COST};
pub use dataset::{load_samples, read_records, LabeledSample};
pub use logistic::{LogisticModel, Standardizer, TrainingConfig};
pub use resident::ResidentModel;

use crate::error::ModelResult;
use crate::schema::{FeedbackRecord, PredictionRequest, RiskClass};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the seed training data
pub const DEFAULT_DATASET_PATH: &str = "data/credit_seed.csv";

/// Trait for model implementations behind the HTTP layer
///
/// Implementations own their concurrency discipline: `predict` may run
/// concurrently with itself and with `retrain`.
pub trait CreditModel: Send + Sync {
    /// Score a single applicant
    fn predict(&self, request: &PredictionRequest) -> ModelResult<Prediction>;

    /// Fold a batch of labeled examples into the resident model
    ///
    /// The batch is applied as a whole or not at all.
    fn retrain(&self, records: &[FeedbackRecord]) -> ModelResult<RetrainSummary>;

    /// Describe the currently resident model
    fn info(&self) -> ModelResult<ModelInfo>;
}

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub risk: RiskClass,
    pub probability_bad: f64,
    pub model_version: String,
}

/// Outcome of a retrain
#[derive(Debug, Clone, PartialEq)]
pub struct RetrainSummary {
    pub previous_version: String,
    pub model_version: String,
    pub records_added: usize,
    pub training_samples: usize,
    pub trained_at: i64,
}

/// Description of the resident model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub version: String,
    pub training_samples: usize,
    pub decision_threshold: f64,
    pub features: Vec<String>,
    pub trained_at: i64,
}

/// Model loading configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Seed training data (CSV)
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub cost_matrix: CostMatrix,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_PATH)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            training: TrainingConfig::default(),
            cost_matrix: CostMatrix::default(),
        }
    }
}
