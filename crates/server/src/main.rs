//! Credit Scorer - credit applicant risk scoring service
//!
//! Trains the resident model once at startup, then serves predictions and
//! folds labeled feedback back into the model.

use anyhow::{Context, Result};
use credit_scorer::{api, config::ServerConfig};
use scoring_lib::{
    health::{components, HealthRegistry},
    observability::{ScorerMetrics, StructuredLogger},
    CreditModel, ResidentModel,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting credit-scorer");

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr();
    info!(bind_addr = %bind_addr, dataset = ?config.model.dataset_path, "Scorer configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::FEEDBACK_LOOP).await;

    let metrics = ScorerMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);

    // The model must be resident before the listener accepts traffic
    let start = Instant::now();
    let model_config = config.model.clone();
    let loaded = tokio::task::spawn_blocking(move || ResidentModel::load(&model_config))
        .await
        .context("Model loading task failed")?;
    let model = match loaded {
        Ok(model) => model,
        Err(err) => {
            health_registry
                .set_unhealthy(components::MODEL, err.to_string())
                .await;
            error!(error = %err, "Failed to load model");
            return Err(err).context("Cannot start without a model");
        }
    };

    health_registry.set_healthy(components::MODEL).await;

    let info = model.info()?;
    metrics.set_model_version(&info.version);
    metrics.set_training_samples(info.training_samples);
    logger.log_model_loaded(&info.version, info.training_samples, start.elapsed().as_millis());

    let model: Arc<dyn CreditModel> = Arc::new(model);
    let state = Arc::new(api::AppState::new(
        model,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));
    let app = api::create_router(state, &config.routes);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    health_registry.set_ready(true).await;
    logger.log_startup(SERVICE_VERSION, &bind_addr);

    let shutdown_logger = logger.clone();
    api::serve(listener, app, async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        shutdown_logger.log_shutdown("SIGINT received");
    })
    .await?;

    info!("Shut down cleanly");
    Ok(())
}
