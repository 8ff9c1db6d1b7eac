//! Service configuration

use anyhow::{Context, Result};
use predictor_lib::artifacts::{
    FetchConfig, DEFAULT_ARTIFACT_BASE_URL, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MAX_ARTIFACT_BYTES,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name used in structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP port for the prediction API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Base URL of the artifact bucket
    #[serde(default = "default_artifact_base_url")]
    pub artifact_base_url: String,

    /// Local artifact directory; takes precedence over the bucket when set
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Per-artifact download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Largest artifact accepted, in bytes
    #[serde(default = "default_max_artifact_bytes")]
    pub max_artifact_bytes: usize,

    /// Load every artifact at startup instead of on the first request
    #[serde(default)]
    pub preload_models: bool,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "fundify-predictor".to_string())
}

fn default_api_port() -> u16 {
    8000
}

fn default_artifact_base_url() -> String {
    DEFAULT_ARTIFACT_BASE_URL.to_string()
}

fn default_download_timeout() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT.as_secs()
}

fn default_max_artifact_bytes() -> usize {
    DEFAULT_MAX_ARTIFACT_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            artifact_base_url: default_artifact_base_url(),
            artifact_dir: None,
            download_timeout_secs: default_download_timeout(),
            max_artifact_bytes: default_max_artifact_bytes(),
            preload_models: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `PREDICTOR_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("PREDICTOR").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid PREDICTOR_* configuration")
    }

    /// Where artifacts are read from, for the startup log
    pub fn artifact_location(&self) -> String {
        match &self.artifact_dir {
            Some(dir) => dir.display().to_string(),
            None => self.artifact_base_url.clone(),
        }
    }

    /// Settings for downloading artifacts from the bucket
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.artifact_base_url.clone(),
            timeout: Duration::from_secs(self.download_timeout_secs),
            max_artifact_bytes: self.max_artifact_bytes,
        }
    }
}
