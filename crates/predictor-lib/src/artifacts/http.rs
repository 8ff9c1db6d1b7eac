//! Artifact download from the object store over HTTP(S)

use super::{ArtifactKind, ArtifactSource};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Bucket holding the trained artifacts
pub const DEFAULT_ARTIFACT_BASE_URL: &str = "https://aibucket-fundify.s3.eu-north-1.amazonaws.com/";

/// Large classifiers take a while over slow links (5 minutes)
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum artifact size in bytes (1GiB)
pub const DEFAULT_MAX_ARTIFACT_BYTES: usize = 1024 * 1024 * 1024;

/// Progress is logged every time this many more percent have arrived
const PROGRESS_STEP_PERCENT: u64 = 10;

/// Configuration for artifact downloads
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL that artifact file names are resolved against
    pub base_url: String,
    /// Timeout for a single artifact download
    pub timeout: Duration,
    /// Bodies larger than this are rejected
    pub max_artifact_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARTIFACT_BASE_URL.to_string(),
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

/// Downloads artifacts with a buffered streaming GET
pub struct HttpArtifactSource {
    client: Client,
    base_url: Url,
    max_artifact_bytes: usize,
}

impl HttpArtifactSource {
    /// Create a new HTTP artifact source
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        // Url::join replaces the last path segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|source| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            max_artifact_bytes: config.max_artifact_bytes,
        })
    }

    /// Resolve the download URL of an artifact
    pub fn url_for(&self, kind: ArtifactKind) -> Result<Url, FetchError> {
        self.base_url
            .join(kind.file_name())
            .map_err(|source| FetchError::InvalidUrl {
                url: format!("{}{}", self.base_url, kind.file_name()),
                source,
            })
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&self, kind: ArtifactKind) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(kind)?;
        let url_str = url.to_string();
        info!(artifact = %kind, url = %url_str, "Downloading artifact");

        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url_str.clone(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str.clone(),
                status: status.as_u16(),
            });
        }

        let total_size = response.content_length().filter(|size| *size > 0);
        if let Some(total) = total_size {
            if total > self.max_artifact_bytes as u64 {
                return Err(FetchError::TooLarge {
                    url: url_str.clone(),
                    max_bytes: self.max_artifact_bytes,
                });
            }
            info!(
                artifact = %kind,
                size_mb = %format!("{:.1}", total as f64 / (1024.0 * 1024.0)),
                "Artifact size"
            );
        }

        let mut body = Vec::with_capacity(total_size.unwrap_or(0) as usize);
        let mut next_report = PROGRESS_STEP_PERCENT;

        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            body.extend_from_slice(&chunk);

            if body.len() > self.max_artifact_bytes {
                return Err(FetchError::TooLarge {
                    url: url_str.clone(),
                    max_bytes: self.max_artifact_bytes,
                });
            }

            if let Some(total) = total_size {
                let progress = (body.len() as u64 * 100 / total).min(100);
                if progress >= next_report {
                    debug!(artifact = %kind, progress_percent = progress, "Downloading...");
                    next_report = progress - progress % PROGRESS_STEP_PERCENT + PROGRESS_STEP_PERCENT;
                }
            }
        }

        info!(artifact = %kind, bytes = body.len(), "Download complete");
        Ok(body)
    }

    fn location(&self, kind: ArtifactKind) -> String {
        self.url_for(kind)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| kind.file_name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_for(server: &mockito::ServerGuard, max_artifact_bytes: usize) -> HttpArtifactSource {
        HttpArtifactSource::new(FetchConfig {
            base_url: format!("{}/models", server.url()),
            timeout: Duration::from_secs(5),
            max_artifact_bytes,
        })
        .unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.base_url, DEFAULT_ARTIFACT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_artifact_bytes, 1024 * 1024 * 1024);
    }

    #[test]
    fn test_url_for_appends_file_name() {
        let source = HttpArtifactSource::new(FetchConfig {
            base_url: "https://bucket.example.com/releases".to_string(),
            ..Default::default()
        })
        .unwrap();

        let url = source.url_for(ArtifactKind::CountryEncoder).unwrap();
        assert_eq!(
            url.as_str(),
            "https://bucket.example.com/releases/CountryEncoder.json"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpArtifactSource::new(FetchConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_downloads_full_body() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![7u8; 64 * 1024];
        let mock = server
            .mock("GET", "/models/StateEncoder.json")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let source = source_for(&server, 1024 * 1024);
        let bytes = source.fetch(ArtifactKind::StateEncoder).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, body);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models/trained_model.json")
            .with_status(403)
            .with_body("AccessDenied")
            .create_async()
            .await;

        let source = source_for(&server, 1024);
        let err = source.fetch(ArtifactKind::Classifier).await.unwrap_err();

        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, 403);
                assert!(url.ends_with("/models/trained_model.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models/CategoryEncoder.json")
            .with_status(200)
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let source = source_for(&server, 1024);
        let err = source.fetch(ArtifactKind::CategoryEncoder).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { max_bytes: 1024, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let source = HttpArtifactSource::new(FetchConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let err = source.fetch(ArtifactKind::CurrencyEncoder).await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
