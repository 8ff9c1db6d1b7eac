//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, artifact downloads, error counts)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Artifact downloads range from milliseconds to the 5 minute timeout
const DOWNLOAD_BUCKETS: &[f64] = &[0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    artifact_download_seconds: Histogram,
    artifact_bytes: GaugeVec,
    models_loaded: IntGauge,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    unknown_category_total: IntCounter,
    model_load_failures_total: IntCounter,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "fundify_prediction_latency_seconds",
                "Time spent serving a single prediction request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            artifact_download_seconds: register_histogram!(
                "fundify_artifact_download_seconds",
                "Time spent fetching the raw bytes of a single model artifact",
                DOWNLOAD_BUCKETS.to_vec()
            )
            .expect("Failed to register artifact_download_seconds"),

            artifact_bytes: register_gauge_vec!(
                "fundify_artifact_bytes",
                "Size of the most recently loaded artifact",
                &["artifact"]
            )
            .expect("Failed to register artifact_bytes"),

            models_loaded: register_int_gauge!(
                "fundify_models_loaded",
                "Whether the classifier and encoders are loaded (1) or not (0)"
            )
            .expect("Failed to register models_loaded"),

            predictions_total: register_int_counter!(
                "fundify_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "fundify_prediction_errors_total",
                "Total number of prediction requests answered with an error payload"
            )
            .expect("Failed to register prediction_errors_total"),

            unknown_category_total: register_int_counter!(
                "fundify_unknown_category_total",
                "Total number of requests rejected for an unseen category"
            )
            .expect("Failed to register unknown_category_total"),

            model_load_failures_total: register_int_counter!(
                "fundify_model_load_failures_total",
                "Total number of failed model loading attempts"
            )
            .expect("Failed to register model_load_failures_total"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Record a completed artifact fetch and its size
    pub fn observe_artifact_download(&self, artifact: &str, duration_secs: f64, bytes: usize) {
        self.inner().artifact_download_seconds.observe(duration_secs);
        self.inner()
            .artifact_bytes
            .with_label_values(&[artifact])
            .set(bytes as f64);
    }

    pub fn set_models_loaded(&self, loaded: bool) {
        self.inner().models_loaded.set(i64::from(loaded));
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_unknown_category(&self) {
        self.inner().unknown_category_total.inc();
    }

    pub fn inc_model_load_failures(&self) {
        self.inner().model_load_failures_total.inc();
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for model loading,
/// predictions, and other significant events.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("fundify-predictor")
    }
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, port: u16, artifact_location: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            port = port,
            artifact_location = %artifact_location,
            "Fundify ML Prediction API started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Fundify ML Prediction API shutting down"
        );
    }

    /// Log a single artifact becoming available
    pub fn log_artifact_loaded(&self, artifact: &str, location: &str, bytes: usize, checksum: &str) {
        info!(
            event = "artifact_loaded",
            instance = %self.instance,
            artifact = %artifact,
            location = %location,
            bytes = bytes,
            checksum = %checksum,
            "Artifact loaded"
        );
    }

    /// Log completion of the full model loading sequence
    pub fn log_models_loaded(&self, elapsed_ms: u128, expected_features: Option<&[String]>) {
        info!(
            event = "models_loaded",
            instance = %self.instance,
            elapsed_ms = elapsed_ms as u64,
            expected_features = ?expected_features,
            "All models and encoders loaded successfully"
        );
    }

    /// Log a failed model loading sequence
    pub fn log_model_load_failed(&self, error: &str) {
        warn!(
            event = "model_load_failed",
            instance = %self.instance,
            error = %error,
            "Error loading models/encoders"
        );
    }

    /// Log a served prediction
    pub fn log_prediction(
        &self,
        predicted_state: &str,
        prediction_code: i64,
        success_probability: f64,
        latency_us: u128,
    ) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            predicted_state = %predicted_state,
            prediction_code = prediction_code,
            success_probability = success_probability,
            latency_us = latency_us as u64,
            "Generated campaign prediction"
        );
    }

    /// Log a rejected categorical value
    pub fn log_unknown_category(&self, field: &str, value: &str) {
        warn!(
            event = "unknown_category",
            instance = %self.instance,
            field = %field,
            value = %value,
            "Categorical value not seen during training"
        );
    }

    /// Log an outcome code the state encoder could not decode
    pub fn log_decode_fallback(&self, prediction_code: i64, error: &str) {
        warn!(
            event = "decode_fallback",
            instance = %self.instance,
            prediction_code = prediction_code,
            error = %error,
            "Error in inverse transform, returning numeric state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_metrics_creation() {
        // Metrics live in the process-wide Prometheus registry, so repeated
        // handles must share one registration.
        let metrics = PredictorMetrics::new();
        let again = PredictorMetrics::new();

        metrics.observe_prediction_latency(0.002);
        metrics.observe_artifact_download("classifier", 1.5, 2048);
        metrics.set_models_loaded(true);
        again.inc_predictions();
        again.inc_prediction_errors();
        again.inc_unknown_category();
        again.inc_model_load_failures();

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "fundify_prediction_latency_seconds"));
    }

    #[test]
    fn test_download_histogram_describes_fetch_only() {
        PredictorMetrics::new().observe_artifact_download("state_encoder", 0.01, 64);

        let family = prometheus::gather()
            .into_iter()
            .find(|f| f.get_name() == "fundify_artifact_download_seconds")
            .unwrap();
        assert_eq!(
            family.get_help(),
            "Time spent fetching the raw bytes of a single model artifact"
        );
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance(), "test-instance");
        assert_eq!(StructuredLogger::default().instance(), "fundify-predictor");
    }
}
