//! HTTP API: scoring endpoints plus operator probes and Prometheus metrics

use crate::config::RoutesConfig;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use scoring_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::{endpoints, ScorerMetrics, StructuredLogger},
    CreditModel, Detail, FeedbackRecord, HealthAck, ModelError, ModelInfo, PredictionRequest,
    PredictionResponse,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub model: Arc<dyn CreditModel>,
    pub health_registry: HealthRegistry,
    pub metrics: ScorerMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        model: Arc<dyn CreditModel>,
        health_registry: HealthRegistry,
        metrics: ScorerMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            model,
            health_registry,
            metrics,
            logger,
        }
    }

    fn reject(&self, endpoint: &str, error: ApiError) -> ApiError {
        self.metrics.inc_validation_failures(endpoint);
        error
    }
}

/// Errors surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation; nothing reached the model
    #[error("{detail}")]
    Validation { status: StatusCode, detail: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model task did not complete: {0}")]
    Task(#[from] JoinError),

    #[error("failed to encode metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    pub fn empty_batch() -> Self {
        ApiError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: "feedback batch must contain at least one record".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Malformed JSON and schema mismatches are both unprocessable input
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status(),
        };
        ApiError::Validation {
            status,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { status, detail } => {
                (status, Json(Detail::new(detail))).into_response()
            }
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Detail::new("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}

/// Collapse a blocking task's join result and the model result into one error
fn flatten<T>(outcome: Result<Result<T, ModelError>, JoinError>) -> Result<T, ApiError> {
    Ok(outcome??)
}

/// Fixed liveness acknowledgment, independent of model state
async fn ping() -> Json<HealthAck> {
    Json(HealthAck::default())
}

async fn predict_creditscore(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| state.reject(endpoints::PREDICT, rejection.into()))?;

    let start = Instant::now();
    let model = Arc::clone(&state.model);
    let outcome = tokio::task::spawn_blocking(move || model.predict(&request)).await;
    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());

    let prediction = flatten(outcome).map_err(|err| {
        state.metrics.inc_prediction_errors();
        err
    })?;

    state.metrics.inc_predictions(prediction.risk);
    state.logger.log_prediction(
        prediction.risk,
        prediction.probability_bad,
        &prediction.model_version,
    );

    Ok(Json(PredictionResponse::from(prediction.risk)))
}

async fn feedback_loop(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<FeedbackRecord>>, JsonRejection>,
) -> Result<Json<Detail>, ApiError> {
    let Json(records) =
        payload.map_err(|rejection| state.reject(endpoints::FEEDBACK, rejection.into()))?;

    if records.is_empty() {
        return Err(state.reject(endpoints::FEEDBACK, ApiError::empty_batch()));
    }

    let batch_size = records.len();
    let start = Instant::now();
    let model = Arc::clone(&state.model);
    let outcome = tokio::task::spawn_blocking(move || model.retrain(&records)).await;
    state
        .metrics
        .observe_retrain_latency(start.elapsed().as_secs_f64());

    match flatten(outcome) {
        Ok(summary) => {
            state.metrics.add_feedback_records(summary.records_added);
            state.metrics.set_training_samples(summary.training_samples);
            state.metrics.set_model_version(&summary.model_version);
            state.health_registry.set_healthy(components::MODEL).await;
            state
                .health_registry
                .set_healthy(components::FEEDBACK_LOOP)
                .await;
            state.logger.log_retrain(
                &summary.previous_version,
                &summary.model_version,
                summary.records_added,
                summary.training_samples,
            );
            Ok(Json(Detail::feedback_successful()))
        }
        Err(err) => {
            let message = err.to_string();
            state.metrics.inc_retrain_errors();
            state
                .health_registry
                .set_degraded(components::MODEL, "serving previous version after failed retrain")
                .await;
            state
                .health_registry
                .set_degraded(components::FEEDBACK_LOOP, message.as_str())
                .await;
            state.logger.log_retrain_failed(batch_size, &message);
            Err(err)
        }
    }
}

async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<ModelInfo>, ApiError> {
    Ok(Json(state.model.info()?))
}

/// Component health - 200 unless a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness - 200 once the model is resident
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>, routes: &RoutesConfig) -> Router {
    Router::new()
        .route(&routes.health, get(ping))
        .route(&routes.predict, post(predict_creditscore))
        .route(&routes.feedback, post(feedback_loop))
        .route("/model_info", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the router on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), "Starting API server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
