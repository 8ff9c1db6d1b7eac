//! Model registry
//!
//! Holds the trained classifier and the four categorical encoders. The
//! artifacts are fetched on first use and then served from memory for
//! the lifetime of the process. Loading is all-or-nothing: a failure
//! anywhere in the sequence keeps nothing, and the next caller retries
//! from scratch. Concurrent first callers share a single in-flight load.

use crate::artifacts::{compute_checksum, ArtifactKind, ArtifactSource};
use crate::encoders::CategoricalEncoder;
use crate::error::LoadError;
use crate::loader::ArtifactLoader;
use crate::models::{EncodersLoaded, ModelInfo};
use crate::observability::{PredictorMetrics, StructuredLogger};
use crate::predictor::Classifier;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::info;

/// The full set of loaded artifacts
pub struct LoadedModels {
    pub classifier: Arc<dyn Classifier>,
    pub category_encoder: Arc<dyn CategoricalEncoder>,
    pub country_encoder: Arc<dyn CategoricalEncoder>,
    pub currency_encoder: Arc<dyn CategoricalEncoder>,
    pub state_encoder: Arc<dyn CategoricalEncoder>,
}

/// Lazily-loaded, shared model registry
pub struct ModelRegistry {
    source: Arc<dyn ArtifactSource>,
    loader: Arc<dyn ArtifactLoader>,
    models: OnceCell<Arc<LoadedModels>>,
    metrics: PredictorMetrics,
    logger: StructuredLogger,
}

impl ModelRegistry {
    /// Create an empty registry. Nothing is fetched until first use.
    pub fn new(source: Arc<dyn ArtifactSource>, loader: Arc<dyn ArtifactLoader>) -> Self {
        Self {
            source,
            loader,
            models: OnceCell::new(),
            metrics: PredictorMetrics::new(),
            logger: StructuredLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Load every artifact before handing the registry out
    pub async fn preload(self) -> Result<Self, LoadError> {
        self.load().await?;
        Ok(self)
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Whether every artifact is loaded and ready
    pub fn is_loaded(&self) -> bool {
        self.models.initialized()
    }

    /// Loaded models, if the registry has been loaded
    pub fn get(&self) -> Option<Arc<LoadedModels>> {
        self.models.get().cloned()
    }

    /// Load every artifact unless already loaded
    pub async fn load(&self) -> Result<Arc<LoadedModels>, LoadError> {
        let models = self.models.get_or_try_init(|| self.load_all()).await?;
        Ok(Arc::clone(models))
    }

    /// Introspection snapshot of the registry
    pub fn info(&self) -> ModelInfo {
        match self.models.get() {
            Some(models) => ModelInfo {
                model_loaded: true,
                models_loaded_flag: true,
                encoders_loaded: EncodersLoaded {
                    category: true,
                    country: true,
                    currency: true,
                    state: true,
                },
                expected_features: models.classifier.feature_names().map(|names| names.to_vec()),
            },
            None => ModelInfo::default(),
        }
    }

    async fn load_all(&self) -> Result<Arc<LoadedModels>, LoadError> {
        let start = Instant::now();
        info!("Loading models and encoders");

        match self.fetch_all().await {
            Ok(models) => {
                self.metrics.set_models_loaded(true);
                self.logger.log_models_loaded(
                    start.elapsed().as_millis(),
                    models.classifier.feature_names(),
                );
                Ok(Arc::new(models))
            }
            Err(e) => {
                self.metrics.set_models_loaded(false);
                self.metrics.inc_model_load_failures();
                self.logger.log_model_load_failed(&e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch in `ArtifactKind::LOAD_ORDER`: encoders first, classifier last
    async fn fetch_all(&self) -> Result<LoadedModels, LoadError> {
        let category_encoder = self.load_encoder(ArtifactKind::CategoryEncoder).await?;
        let country_encoder = self.load_encoder(ArtifactKind::CountryEncoder).await?;
        let currency_encoder = self.load_encoder(ArtifactKind::CurrencyEncoder).await?;
        let state_encoder = self.load_encoder(ArtifactKind::StateEncoder).await?;

        info!("Loading main model (this may take a while)");
        let bytes = self.fetch(ArtifactKind::Classifier).await?;
        let classifier = self
            .loader
            .load_classifier(&bytes)
            .map_err(|source| LoadError::Format {
                artifact: ArtifactKind::Classifier,
                source,
            })?;

        Ok(LoadedModels {
            classifier,
            category_encoder,
            country_encoder,
            currency_encoder,
            state_encoder,
        })
    }

    async fn load_encoder(&self, kind: ArtifactKind) -> Result<Arc<dyn CategoricalEncoder>, LoadError> {
        let bytes = self.fetch(kind).await?;
        self.loader
            .load_encoder(&bytes)
            .map_err(|source| LoadError::Format {
                artifact: kind,
                source,
            })
    }

    async fn fetch(&self, kind: ArtifactKind) -> Result<Vec<u8>, LoadError> {
        let start = Instant::now();
        let location = self.source.location(kind);

        let bytes = self
            .source
            .fetch(kind)
            .await
            .map_err(|source| LoadError::Fetch {
                artifact: kind,
                source,
            })?;

        self.metrics
            .observe_artifact_download(kind.as_str(), start.elapsed().as_secs_f64(), bytes.len());
        self.logger
            .log_artifact_loaded(kind.as_str(), &location, bytes.len(), &compute_checksum(&bytes));

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::loader::JsonArtifactLoader;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const FOREST: &str = r#"{
        "type": "random_forest",
        "classes": [0, 1],
        "n_features": 9,
        "feature_names": ["main_category", "currency", "goal", "pledged", "backers",
                          "country", "pkr_pledged", "pkr_pledged_real", "pkr_goal_real"],
        "trees": [{
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [3, -2, -2],
            "threshold": [1000.0, -2.0, -2.0],
            "value": [[1.0, 1.0], [9.0, 1.0], [2.0, 8.0]]
        }]
    }"#;

    /// In-memory source that counts fetches per artifact
    struct CountingSource {
        artifacts: HashMap<ArtifactKind, String>,
        fetches: Mutex<Vec<ArtifactKind>>,
        failures_left: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new() -> Self {
            let mut artifacts = HashMap::new();
            artifacts.insert(
                ArtifactKind::CategoryEncoder,
                r#"{"type": "label", "classes": ["Art", "Games"]}"#.to_string(),
            );
            artifacts.insert(
                ArtifactKind::CountryEncoder,
                r#"{"type": "label", "classes": ["GB", "US"]}"#.to_string(),
            );
            artifacts.insert(
                ArtifactKind::CurrencyEncoder,
                r#"{"type": "label", "classes": ["GBP", "USD"]}"#.to_string(),
            );
            artifacts.insert(
                ArtifactKind::StateEncoder,
                r#"{"type": "label", "classes": ["failed", "successful"]}"#.to_string(),
            );
            artifacts.insert(ArtifactKind::Classifier, FOREST.to_string());

            Self {
                artifacts,
                fetches: Mutex::new(Vec::new()),
                failures_left: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        /// Fail the next `count` classifier fetches
        fn failing_classifier(self, count: usize) -> Self {
            self.failures_left.store(count, Ordering::SeqCst);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn fetches(&self) -> Vec<ArtifactKind> {
            self.fetches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactSource for CountingSource {
        async fn fetch(&self, kind: ArtifactKind) -> Result<Vec<u8>, FetchError> {
            self.fetches.lock().unwrap().push(kind);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if kind == ArtifactKind::Classifier
                && self
                    .failures_left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(FetchError::Status {
                    url: "memory://trained_model.json".to_string(),
                    status: 503,
                });
            }

            Ok(self.artifacts[&kind].clone().into_bytes())
        }

        fn location(&self, kind: ArtifactKind) -> String {
            format!("memory://{}", kind.file_name())
        }
    }

    fn registry(source: Arc<CountingSource>) -> ModelRegistry {
        ModelRegistry::new(source, Arc::new(JsonArtifactLoader::new()))
    }

    #[tokio::test]
    async fn test_registry_starts_empty() {
        let source = Arc::new(CountingSource::new());
        let registry = registry(source.clone());

        assert!(!registry.is_loaded());
        assert!(registry.get().is_none());
        assert_eq!(registry.info(), ModelInfo::default());
        assert!(source.fetches().is_empty());
    }

    #[tokio::test]
    async fn test_load_fetches_in_order_once() {
        let source = Arc::new(CountingSource::new());
        let registry = registry(source.clone());

        registry.load().await.unwrap();
        registry.load().await.unwrap();
        registry.load().await.unwrap();

        assert!(registry.is_loaded());
        assert_eq!(source.fetches(), ArtifactKind::LOAD_ORDER.to_vec());
    }

    #[tokio::test]
    async fn test_info_after_load() {
        let registry = registry(Arc::new(CountingSource::new()));
        registry.load().await.unwrap();

        let info = registry.info();
        assert!(info.model_loaded);
        assert!(info.models_loaded_flag);
        assert!(info.encoders_loaded.category && info.encoders_loaded.state);
        assert_eq!(info.expected_features.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_nothing_and_retries() {
        let source = Arc::new(CountingSource::new().failing_classifier(1));
        let registry = registry(source.clone());

        let err = registry.load().await.err().unwrap();
        assert!(matches!(
            err,
            LoadError::Fetch {
                artifact: ArtifactKind::Classifier,
                ..
            }
        ));
        assert!(!registry.is_loaded());
        assert_eq!(registry.info(), ModelInfo::default());

        // The retry starts over from the first encoder
        registry.load().await.unwrap();
        assert!(registry.is_loaded());
        assert_eq!(source.fetches().len(), 10);
    }

    #[tokio::test]
    async fn test_format_error_names_artifact() {
        let mut source = CountingSource::new();
        source
            .artifacts
            .insert(ArtifactKind::CountryEncoder, "not json".to_string());
        let source = Arc::new(source);
        let registry = registry(source.clone());

        let err = registry.load().await.err().unwrap();
        assert!(err.to_string().contains("country_encoder"));
        // Classifier is never downloaded after a cheap artifact fails
        assert!(!source.fetches().contains(&ArtifactKind::Classifier));
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_share_one_fetch() {
        let source = Arc::new(CountingSource::new().with_delay(Duration::from_millis(20)));
        let registry = Arc::new(registry(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.load().await.map(|_| ()) })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.fetches().len(), 5);
    }

    #[tokio::test]
    async fn test_preload_keeps_configured_logger() {
        let source = Arc::new(CountingSource::new());
        let registry = registry(source.clone())
            .with_logger(StructuredLogger::new("predictor-eu-1"))
            .preload()
            .await
            .unwrap();

        assert!(registry.is_loaded());
        assert!(registry.get().is_some());
        assert_eq!(registry.logger().instance(), "predictor-eu-1");
        assert_eq!(source.fetches().len(), 5);
    }
}
