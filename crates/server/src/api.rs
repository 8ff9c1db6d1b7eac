//! HTTP API for predictions, model management and Prometheus metrics
//!
//! Pipeline and loading failures are reported as `{"error": ...}` or
//! `{"status": "error", ...}` payloads with a 200 status. Callers detect
//! failure from the body.

use crate::config::ServerConfig;
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    ArtifactSource, CampaignRecord, FileArtifactSource, HealthResponse, HttpArtifactSource,
    JsonArtifactLoader, LoadResponse, ModelRegistry, PredictResponse, PredictionPipeline,
    PredictorMetrics, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub pipeline: PredictionPipeline,
    pub metrics: PredictorMetrics,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, metrics: PredictorMetrics) -> Self {
        Self {
            pipeline: PredictionPipeline::new(registry.clone()),
            registry,
            metrics,
        }
    }

    /// Wire the artifact source, registry and pipeline from configuration.
    /// With `preload_models` set, every artifact is loaded before returning.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        // A local artifact directory wins over the bucket
        let source: Arc<dyn ArtifactSource> = match &config.artifact_dir {
            Some(dir) => Arc::new(FileArtifactSource::new(dir.clone())),
            None => Arc::new(
                HttpArtifactSource::new(config.fetch_config())
                    .context("Invalid artifact base URL")?,
            ),
        };

        let registry = ModelRegistry::new(source, Arc::new(JsonArtifactLoader::new()))
            .with_logger(StructuredLogger::new(&config.instance_name));
        let registry = if config.preload_models {
            registry.preload().await.context("Failed to preload models")?
        } else {
            registry
        };

        let metrics = PredictorMetrics::new();
        metrics.set_models_loaded(registry.is_loaded());

        Ok(Self::new(Arc::new(registry), metrics))
    }
}

/// Health check; never fails
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Fundify ML Prediction API is running".to_string(),
        models_loaded: state.registry.is_loaded(),
    })
}

/// Predict the outcome of a campaign
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<CampaignRecord>,
) -> Json<PredictResponse> {
    Json(state.pipeline.respond(&record).await)
}

/// Load every artifact now instead of on the first prediction
async fn load_models(State(state): State<Arc<AppState>>) -> Json<LoadResponse> {
    match state.registry.load().await {
        Ok(_) => Json(LoadResponse::success()),
        Err(e) => {
            error!(error = %e, "Manual model load failed");
            Json(LoadResponse::error(e.to_string()))
        }
    }
}

/// Which artifacts are loaded, and the classifier's training features
async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let info = state.registry.info();
    match serde_json::to_value(&info) {
        Ok(value) => Json(value),
        Err(e) => {
            error!(error = %e, "Failed to serialize model info");
            Json(serde_json::json!({ "error": "Models not properly loaded" }))
        }
    }
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics.set_models_loaded(state.registry.is_loaded());

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        .route("/predict", post(predict))
        .route("/load-models", post(load_models))
        .route("/model-info", get(model_info))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
