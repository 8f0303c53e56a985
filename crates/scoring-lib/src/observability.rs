//! Observability infrastructure for the scoring service
//!
//! Provides:
//! - Prometheus metrics (prediction/retrain latency, request outcomes, model version)
//! - Structured JSON log events with tracing

use crate::schema::RiskClass;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const PREDICTION_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Histogram buckets for retrain latency (in seconds)
const RETRAIN_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Endpoint labels for validation failures
pub mod endpoints {
    pub const PREDICT: &str = "predict";
    pub const FEEDBACK: &str = "feedback";
}

static GLOBAL_METRICS: OnceLock<ScorerMetricsInner> = OnceLock::new();

struct ScorerMetricsInner {
    prediction_latency_seconds: Histogram,
    retrain_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounter,
    feedback_records_total: IntCounter,
    retrain_errors_total: IntCounter,
    validation_failures_total: IntCounterVec,
    training_samples: IntGauge,
    model_version_info: GaugeVec,
}

impl ScorerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "credit_scorer_prediction_latency_seconds",
                "Time spent scoring a single applicant",
                PREDICTION_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            retrain_latency_seconds: register_histogram!(
                "credit_scorer_retrain_latency_seconds",
                "Time spent refitting the model on a feedback batch",
                RETRAIN_BUCKETS.to_vec()
            )
            .expect("Failed to register retrain_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "credit_scorer_predictions_total",
                "Predictions served, by risk class",
                &["risk"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "credit_scorer_prediction_errors_total",
                "Predictions that failed inside the model"
            )
            .expect("Failed to register prediction_errors_total"),

            feedback_records_total: register_int_counter!(
                "credit_scorer_feedback_records_total",
                "Labeled records folded into the model"
            )
            .expect("Failed to register feedback_records_total"),

            retrain_errors_total: register_int_counter!(
                "credit_scorer_retrain_errors_total",
                "Feedback batches whose retrain failed"
            )
            .expect("Failed to register retrain_errors_total"),

            validation_failures_total: register_int_counter_vec!(
                "credit_scorer_validation_failures_total",
                "Requests rejected before reaching the model",
                &["endpoint"]
            )
            .expect("Failed to register validation_failures_total"),

            training_samples: register_int_gauge!(
                "credit_scorer_training_samples",
                "Number of samples the resident model was fitted on"
            )
            .expect("Failed to register training_samples"),

            model_version_info: register_gauge_vec!(
                "credit_scorer_model_version_info",
                "Version of the currently resident model",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Handle to the process-wide scorer metrics
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct ScorerMetrics {
    _private: (),
}

impl Default for ScorerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScorerMetrics {
    /// Create a metrics handle, registering the collectors on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ScorerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ScorerMetricsInner {
        GLOBAL_METRICS.get_or_init(ScorerMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn observe_retrain_latency(&self, duration_secs: f64) {
        self.inner().retrain_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, risk: RiskClass) {
        self.inner()
            .predictions_total
            .with_label_values(&[risk.as_str()])
            .inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn add_feedback_records(&self, count: usize) {
        self.inner().feedback_records_total.inc_by(count as u64);
    }

    pub fn inc_retrain_errors(&self) {
        self.inner().retrain_errors_total.inc();
    }

    pub fn inc_validation_failures(&self, endpoint: &str) {
        self.inner()
            .validation_failures_total
            .with_label_values(&[endpoint])
            .inc();
    }

    pub fn set_training_samples(&self, count: usize) {
        self.inner().training_samples.set(count as i64);
    }

    /// Replace the model version label
    pub fn set_model_version(&self, version: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Structured logger for scoring events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, bind_addr: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            bind_addr = %bind_addr,
            "Credit scorer listening"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, training_samples: usize, elapsed_ms: u128) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_version = %model_version,
            training_samples = training_samples,
            elapsed_ms = elapsed_ms,
            "Model trained and resident"
        );
    }

    pub fn log_prediction(&self, risk: RiskClass, probability_bad: f64, model_version: &str) {
        info!(
            event = "prediction_served",
            instance = %self.instance,
            risk = %risk,
            probability_bad = probability_bad,
            model_version = %model_version,
            "Scored applicant"
        );
    }

    pub fn log_retrain(
        &self,
        old_version: &str,
        new_version: &str,
        records_added: usize,
        training_samples: usize,
    ) {
        info!(
            event = "model_retrained",
            instance = %self.instance,
            old_version = %old_version,
            new_version = %new_version,
            records_added = records_added,
            training_samples = training_samples,
            "Model retrained from feedback"
        );
    }

    pub fn log_retrain_failed(&self, records: usize, error: &str) {
        warn!(
            event = "model_retrain_failed",
            instance = %self.instance,
            records = records,
            error = %error,
            "Retrain failed, keeping previous model"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Credit scorer shutting down"
        );
    }
}
