//! Per-request prediction pipeline

use super::features::FeatureExtractor;
use super::output::OutputFormatter;
use crate::error::PredictError;
use crate::models::{CampaignRecord, ErrorResponse, PredictResponse, PredictionResult};
use crate::observability::{PredictorMetrics, StructuredLogger};
use crate::registry::ModelRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs campaign records through the encoders and classifier
pub struct PredictionPipeline {
    registry: Arc<ModelRegistry>,
    formatter: OutputFormatter,
    metrics: PredictorMetrics,
    logger: StructuredLogger,
}

impl PredictionPipeline {
    /// Events are logged under the registry's instance name
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            logger: registry.logger().clone(),
            registry,
            formatter: OutputFormatter::new(),
            metrics: PredictorMetrics::new(),
        }
    }

    /// Predict the outcome of one campaign, loading models on first use
    pub async fn predict(&self, record: &CampaignRecord) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();
        let models = self.registry.load().await?;

        debug!(record = ?record, "Input data received");

        let features = match FeatureExtractor::from_models(&models).extract(record) {
            Ok(features) => features,
            Err(e) => {
                if let PredictError::UnknownCategory { field, value } = &e {
                    self.metrics.inc_unknown_category();
                    self.logger.log_unknown_category(field, value);
                }
                return Err(e);
            }
        };
        let row = features.to_row();

        debug!(features = ?row, "Features for model");
        if let Some(expected) = models.classifier.feature_names() {
            debug!(expected = ?expected, "Model expects these features");
        }

        let prediction_code = models.classifier.predict(&row)?;
        let probabilities = models.classifier.predict_probability(&row)?;

        // Decoding is best-effort; an undecodable code still yields a prediction
        let predicted_state = match models.state_encoder.inverse_transform(prediction_code) {
            Ok(label) => label,
            Err(e) => {
                self.logger.log_decode_fallback(prediction_code, &e.to_string());
                OutputFormatter::fallback_label(prediction_code)
            }
        };

        let result = self
            .formatter
            .format(predicted_state, prediction_code, &probabilities)?;

        let elapsed = start.elapsed();
        self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
        self.metrics.inc_predictions();
        self.logger.log_prediction(
            &result.predicted_state,
            result.prediction_code,
            result.success_probability,
            elapsed.as_micros(),
        );

        Ok(result)
    }

    /// Predict and fold any failure into an error payload
    pub async fn respond(&self, record: &CampaignRecord) -> PredictResponse {
        match self.predict(record).await {
            Ok(result) => PredictResponse::Prediction(result),
            Err(e) => {
                self.metrics.inc_prediction_errors();
                debug!(error = %e, "Error in prediction");
                PredictResponse::Error(ErrorResponse::new(e.to_string()))
            }
        }
    }
}
