//! Artifact deserialization
//!
//! Artifacts are JSON documents tagged by `"type"`:
//!
//! ```json
//! {"type": "label", "classes": ["failed", "successful"]}
//! {"type": "ordinal", "categories": ["EUR", "USD"], "unknown_value": -1}
//! {"type": "random_forest", "classes": [0, 1], "n_features": 9, "trees": [...]}
//! {"type": "logistic_regression", "classes": [0, 1], "coefficients": [...], "intercept": 0.0}
//! ```

use crate::encoders::{CategoricalEncoder, LabelEncoder, OrdinalEncoder};
use crate::error::FormatError;
use crate::predictor::inference::{LogisticRegressionSpec, RandomForestSpec};
use crate::predictor::{Classifier, LogisticRegression, RandomForest};
use serde::Deserialize;
use std::sync::Arc;

/// Turns raw artifact bytes into usable encoder and classifier objects
pub trait ArtifactLoader: Send + Sync {
    fn load_encoder(&self, bytes: &[u8]) -> Result<Arc<dyn CategoricalEncoder>, FormatError>;

    fn load_classifier(&self, bytes: &[u8]) -> Result<Arc<dyn Classifier>, FormatError>;
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EncoderSpec {
    Label {
        classes: Vec<String>,
    },
    Ordinal {
        categories: Vec<String>,
        #[serde(default)]
        unknown_value: Option<i64>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClassifierSpec {
    RandomForest(RandomForestSpec),
    LogisticRegression(LogisticRegressionSpec),
}

/// Loader for the JSON artifact format
#[derive(Debug, Default, Clone)]
pub struct JsonArtifactLoader;

impl JsonArtifactLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load_encoder(&self, bytes: &[u8]) -> Result<Arc<dyn CategoricalEncoder>, FormatError> {
        let encoder: Arc<dyn CategoricalEncoder> = match serde_json::from_slice(bytes)? {
            EncoderSpec::Label { classes } => Arc::new(LabelEncoder::new(classes)?),
            EncoderSpec::Ordinal {
                categories,
                unknown_value,
            } => Arc::new(OrdinalEncoder::new(categories, unknown_value)?),
        };
        Ok(encoder)
    }

    fn load_classifier(&self, bytes: &[u8]) -> Result<Arc<dyn Classifier>, FormatError> {
        let classifier: Arc<dyn Classifier> = match serde_json::from_slice(bytes)? {
            ClassifierSpec::RandomForest(spec) => Arc::new(RandomForest::from_spec(spec)?),
            ClassifierSpec::LogisticRegression(spec) => {
                Arc::new(LogisticRegression::from_spec(spec)?)
            }
        };
        Ok(classifier)
    }
}
