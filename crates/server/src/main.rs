//! Fundify ML Prediction API
//!
//! Serves crowdfunding campaign success predictions from a trained
//! classifier and its categorical encoders.

use anyhow::{Context, Result};
use fundify_predictor::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting fundify-predictor");

    let config = ServerConfig::load()?;
    info!(instance = %config.instance_name, "Service configured");

    let app_state = Arc::new(api::AppState::from_config(&config).await?);
    let logger = app_state.registry.logger().clone();

    logger.log_startup(SERVICE_VERSION, config.api_port, &config.artifact_location());

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
