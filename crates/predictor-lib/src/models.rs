//! Core data models for the prediction service

use serde::{Deserialize, Serialize};

/// Number of input features expected by the classifier
pub const NUM_FEATURES: usize = 9;

/// Column order the classifier was trained on. Changing it requires retraining.
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "main_category",
    "currency",
    "goal",
    "pledged",
    "backers",
    "country",
    "pkr_pledged",
    "pkr_pledged_real",
    "pkr_goal_real",
];

/// Campaign attributes submitted for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub main_category: String,
    pub currency: String,
    pub goal: f64,
    pub pledged: f64,
    pub backers: i64,
    pub country: String,
    pub pkr_pledged: f64,
    pub pkr_pledged_real: f64,
    pub pkr_goal_real: f64,
}

/// Encoded feature vector for classifier inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub main_category: f64,
    pub currency: f64,
    pub goal: f64,
    pub pledged: f64,
    pub backers: f64,
    pub country: f64,
    pub pkr_pledged: f64,
    pub pkr_pledged_real: f64,
    pub pkr_goal_real: f64,
}

impl FeatureVector {
    /// Lay the features out in `FEATURE_COLUMNS` order
    pub fn to_row(&self) -> [f64; NUM_FEATURES] {
        [
            self.main_category,
            self.currency,
            self.goal,
            self.pledged,
            self.backers,
            self.country,
            self.pkr_pledged,
            self.pkr_pledged_real,
            self.pkr_goal_real,
        ]
    }
}

/// Per-class probabilities in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub class_0: f64,
    pub class_1: f64,
}

/// Prediction output returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_state: String,
    pub prediction_code: i64,
    pub probabilities: ClassProbabilities,
    pub success_probability: f64,
}

/// Error payload. Failures are reported in the body, not the status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Body of a `/predict` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Prediction(PredictionResult),
    Error(ErrorResponse),
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub models_loaded: bool,
}

/// Outcome of an explicit model load request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResponse {
    pub status: String,
    pub message: String,
}

impl LoadResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Models loaded successfully".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Which encoder slots are populated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodersLoaded {
    pub category: bool,
    pub country: bool,
    pub currency: bool,
    pub state: bool,
}

/// Model introspection snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_loaded: bool,
    pub models_loaded_flag: bool,
    pub encoders_loaded: EncodersLoaded,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_features: Option<Vec<String>>,
}
