//! Prediction library for the Fundify campaign success service
//!
//! This crate provides the core functionality for:
//! - Downloading serialized model artifacts from the object store
//! - Decoding encoder and classifier artifacts
//! - Lazily loading and caching the trained models
//! - Running the campaign success prediction pipeline
//! - Metrics and structured logging

pub mod artifacts;
pub mod encoders;
pub mod error;
pub mod loader;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;

pub use artifacts::{ArtifactKind, ArtifactSource, FetchConfig, FileArtifactSource, HttpArtifactSource};
pub use encoders::{CategoricalEncoder, LabelEncoder, OrdinalEncoder};
pub use error::{EncodeError, FetchError, FormatError, InferenceError, LoadError, PredictError};
pub use loader::{ArtifactLoader, JsonArtifactLoader};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{Classifier, PredictionPipeline};
pub use registry::{LoadedModels, ModelRegistry};
