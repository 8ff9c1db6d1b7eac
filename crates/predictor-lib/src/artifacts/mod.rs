//! Artifact retrieval
//!
//! This module provides:
//! - The fixed set of trained artifacts the service depends on
//! - An `ArtifactSource` abstraction over where their bytes come from
//! - HTTP download from the object store with progress logging
//! - Local directory loading for development and tests

mod file;
mod http;

pub use file::FileArtifactSource;
pub use http::{FetchConfig, HttpArtifactSource, DEFAULT_ARTIFACT_BASE_URL, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MAX_ARTIFACT_BYTES};

use crate::error::FetchError;
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// One of the five trained artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    CategoryEncoder,
    CountryEncoder,
    CurrencyEncoder,
    StateEncoder,
    Classifier,
}

impl ArtifactKind {
    /// Load order: small encoders first, the large classifier last
    pub const LOAD_ORDER: [ArtifactKind; 5] = [
        ArtifactKind::CategoryEncoder,
        ArtifactKind::CountryEncoder,
        ArtifactKind::CurrencyEncoder,
        ArtifactKind::StateEncoder,
        ArtifactKind::Classifier,
    ];

    /// Object name within the artifact bucket
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::CategoryEncoder => "CategoryEncoder.json",
            ArtifactKind::CountryEncoder => "CountryEncoder.json",
            ArtifactKind::CurrencyEncoder => "CurrencyEncoder.json",
            ArtifactKind::StateEncoder => "StateEncoder.json",
            ArtifactKind::Classifier => "trained_model.json",
        }
    }

    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::CategoryEncoder => "category_encoder",
            ArtifactKind::CountryEncoder => "country_encoder",
            ArtifactKind::CurrencyEncoder => "currency_encoder",
            ArtifactKind::StateEncoder => "state_encoder",
            ArtifactKind::Classifier => "classifier",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where artifact bytes come from
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Retrieve the full serialized artifact into memory
    async fn fetch(&self, kind: ArtifactKind) -> Result<Vec<u8>, FetchError>;

    /// Human-readable location of an artifact, for logs
    fn location(&self, kind: ArtifactKind) -> String;
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
