//! Errors raised by the model collaborator

use std::path::PathBuf;
use thiserror::Error;

/// Failure inside model loading, prediction or retraining
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read training data from {path:?}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid training row {row}: {source}")]
    DatasetRow {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("training diverged: {0}")]
    Training(String),

    #[error("model lock poisoned")]
    LockPoisoned,
}

pub type ModelResult<T> = Result<T, ModelError>;
