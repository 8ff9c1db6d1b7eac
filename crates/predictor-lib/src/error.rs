//! Error types for artifact loading and prediction

use crate::artifacts::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving the raw bytes of an artifact
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid artifact URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to download {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Artifact {url} exceeds maximum size of {max_bytes} bytes")]
    TooLarge { url: String, max_bytes: usize },

    #[error("Failed to read artifact file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while decoding artifact bytes into a usable object
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed artifact document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Failure of the full model loading sequence
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch {artifact}: {source}")]
    Fetch {
        artifact: ArtifactKind,
        #[source]
        source: FetchError,
    },

    #[error("Failed to load {artifact}: {source}")]
    Format {
        artifact: ArtifactKind,
        #[source]
        source: FormatError,
    },
}

/// Encoder lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("value {0:?} was not seen during training")]
    UnknownValue(String),

    #[error("code {0} does not map to a known category")]
    UnknownCode(i64),
}

/// Classifier evaluation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Model produced an invalid output: {0}")]
    InvalidOutput(String),
}

/// Anything that stops a single prediction request
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// `field` is the user-facing label (`category`, `country`, `currency`)
    #[error("Unknown {field}: {value}")]
    UnknownCategory { field: &'static str, value: String },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Classifier returned {count} class probabilities, expected at least 2")]
    MissingProbabilities { count: usize },
}
