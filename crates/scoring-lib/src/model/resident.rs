//! In-memory model that is trained at startup and refitted on feedback
//!
//! Predictions clone the current snapshot under a short read lock. Retrains
//! are serialized on the training set mutex, fit off to the side, then publish
//! the new snapshot with a single write-locked swap.

use super::cost::CostMatrix;
use super::dataset::{load_samples, LabeledSample};
use super::logistic::{LogisticModel, TrainingConfig};
use super::{CreditModel, ModelConfig, ModelInfo, Prediction, RetrainSummary};
use crate::error::{ModelError, ModelResult};
use crate::schema::{FeedbackRecord, PredictionRequest, FEATURE_NAMES};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, info};

struct Snapshot {
    model: LogisticModel,
    version: u64,
    training_samples: usize,
    trained_at: i64,
}

impl Snapshot {
    fn version_label(&self) -> String {
        format!("v{}", self.version)
    }
}

/// Logistic regression model resident for the lifetime of the process
pub struct ResidentModel {
    current: RwLock<Arc<Snapshot>>,
    training_set: Mutex<Vec<LabeledSample>>,
    training: TrainingConfig,
    costs: CostMatrix,
}

impl ResidentModel {
    /// Read the seed dataset and fit the initial model
    pub fn load(config: &ModelConfig) -> ModelResult<Self> {
        let samples = load_samples(&config.dataset_path)?;
        info!(
            path = ?config.dataset_path,
            samples = samples.len(),
            "Training initial model"
        );
        Self::from_samples(samples, config.training.clone(), config.cost_matrix)
    }

    /// Fit the initial model from samples already in memory
    pub fn from_samples(
        samples: Vec<LabeledSample>,
        training: TrainingConfig,
        costs: CostMatrix,
    ) -> ModelResult<Self> {
        costs.validate()?;
        let start = Instant::now();
        let model = LogisticModel::fit(&samples, &training)?;
        debug!(elapsed_ms = start.elapsed().as_millis(), "Initial fit completed");

        let snapshot = Snapshot {
            model,
            version: 1,
            training_samples: samples.len(),
            trained_at: chrono::Utc::now().timestamp(),
        };

        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            training_set: Mutex::new(samples),
            training,
            costs,
        })
    }

    fn snapshot(&self) -> ModelResult<Arc<Snapshot>> {
        let guard = self.current.read().map_err(|_| ModelError::LockPoisoned)?;
        Ok(Arc::clone(&*guard))
    }
}

impl CreditModel for ResidentModel {
    fn predict(&self, request: &PredictionRequest) -> ModelResult<Prediction> {
        let snapshot = self.snapshot()?;
        let probability_bad = snapshot.model.probability_bad(&request.features());

        Ok(Prediction {
            risk: self.costs.classify(probability_bad),
            probability_bad,
            model_version: snapshot.version_label(),
        })
    }

    fn retrain(&self, records: &[FeedbackRecord]) -> ModelResult<RetrainSummary> {
        let mut training_set = self
            .training_set
            .lock()
            .map_err(|_| ModelError::LockPoisoned)?;

        let mut candidate = training_set.clone();
        candidate.extend(records.iter().map(LabeledSample::from));

        let start = Instant::now();
        let model = LogisticModel::fit(&candidate, &self.training)?;

        let previous = self.snapshot()?;
        let snapshot = Arc::new(Snapshot {
            model,
            version: previous.version + 1,
            training_samples: candidate.len(),
            trained_at: chrono::Utc::now().timestamp(),
        });

        let summary = RetrainSummary {
            previous_version: previous.version_label(),
            model_version: snapshot.version_label(),
            records_added: records.len(),
            training_samples: snapshot.training_samples,
            trained_at: snapshot.trained_at,
        };

        {
            let mut current = self.current.write().map_err(|_| ModelError::LockPoisoned)?;
            *current = snapshot;
        }
        *training_set = candidate;

        debug!(
            version = %summary.model_version,
            elapsed_ms = start.elapsed().as_millis(),
            "Model refitted"
        );
        Ok(summary)
    }

    fn info(&self) -> ModelResult<ModelInfo> {
        let snapshot = self.snapshot()?;
        Ok(ModelInfo {
            version: snapshot.version_label(),
            training_samples: snapshot.training_samples,
            decision_threshold: self.costs.threshold(),
            features: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
            trained_at: snapshot.trained_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RiskClass;
    use std::path::{Path, PathBuf};

    fn applicant(duration: i64, amount: i64) -> PredictionRequest {
        PredictionRequest {
            duration_in_month: duration,
            credit_amount: amount,
            installment_rate: 3,
            present_residence_since: 2,
            age_in_years: 35,
            existing_credits: 1,
            dependents: 1,
        }
    }

    fn good_only_samples() -> Vec<LabeledSample> {
        (0..20)
            .map(|i| LabeledSample {
                features: applicant(6 + i % 7, 500 + i * 50).features(),
                risk: RiskClass::Good,
            })
            .collect()
    }

    fn bad_feedback() -> Vec<FeedbackRecord> {
        (0..20)
            .map(|i| FeedbackRecord::new(applicant(48 + i % 13, 8000 + i * 200), RiskClass::Bad))
            .collect()
    }

    fn model() -> ResidentModel {
        ResidentModel::from_samples(
            good_only_samples(),
            TrainingConfig::default(),
            CostMatrix::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_version_and_info() {
        let model = model();
        let info = model.info().unwrap();
        assert_eq!(info.version, "v1");
        assert_eq!(info.training_samples, 20);
        assert_eq!(info.features.len(), 7);
        assert!((info.decision_threshold - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_labels_with_version() {
        let model = model();
        let prediction = model.predict(&applicant(8, 700)).unwrap();
        assert_eq!(prediction.risk, RiskClass::Good);
        assert_eq!(prediction.model_version, "v1");
        assert!((0.0..=1.0).contains(&prediction.probability_bad));
    }

    #[test]
    fn test_retrain_shifts_prediction() {
        let model = model();
        let risky = applicant(54, 11000);
        assert_eq!(model.predict(&risky).unwrap().risk, RiskClass::Good);

        let summary = model.retrain(&bad_feedback()).unwrap();
        assert_eq!(summary.previous_version, "v1");
        assert_eq!(summary.model_version, "v2");
        assert_eq!(summary.records_added, 20);
        assert_eq!(summary.training_samples, 40);

        let prediction = model.predict(&risky).unwrap();
        assert_eq!(prediction.risk, RiskClass::Bad);
        assert_eq!(prediction.model_version, "v2");
    }

    #[test]
    fn test_failed_retrain_keeps_previous_model() {
        let mut model = model();
        // Refits now fail config validation
        model.training.epochs = 0;

        let before = model.info().unwrap();
        let err = model.retrain(&bad_feedback()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));

        let after = model.info().unwrap();
        assert_eq!(before.version, after.version);
        assert_eq!(before.training_samples, after.training_samples);
        assert_eq!(model.training_set.lock().unwrap().len(), 20);
    }

    #[test]
    fn test_concurrent_retrains_are_all_applied() {
        let model = Arc::new(model());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let model = Arc::clone(&model);
                std::thread::spawn(move || model.retrain(&bad_feedback()[..5]).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let info = model.info().unwrap();
        assert_eq!(info.version, "v5");
        assert_eq!(info.training_samples, 40);
    }

    #[test]
    fn test_load_missing_dataset_fails() {
        let config = ModelConfig {
            dataset_path: PathBuf::from("/nonexistent/seed.csv"),
            ..ModelConfig::default()
        };
        assert!(ResidentModel::load(&config).is_err());
    }

    #[test]
    fn test_load_shipped_seed_dataset() {
        let config = ModelConfig {
            dataset_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/credit_seed.csv"),
            ..ModelConfig::default()
        };
        let model = ResidentModel::load(&config).unwrap();
        let info = model.info().unwrap();
        assert_eq!(info.version, "v1");
        assert!(info.training_samples >= 50);
    }
}
