//! Artifacts read from a local directory

use super::{ArtifactKind, ArtifactSource};
use crate::error::FetchError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Reads artifacts from a directory laid out like the bucket
pub struct FileArtifactSource {
    dir: PathBuf,
}

impl FileArtifactSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

#[async_trait]
impl ArtifactSource for FileArtifactSource {
    async fn fetch(&self, kind: ArtifactKind) -> Result<Vec<u8>, FetchError> {
        let path = self.path_for(kind);
        debug!(artifact = %kind, path = %path.display(), "Reading artifact file");

        tokio::fs::read(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })
    }

    fn location(&self, kind: ArtifactKind) -> String {
        self.path_for(kind).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_reads_artifact_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("CurrencyEncoder.json"),
            br#"{"type":"label","classes":["EUR","USD"]}"#,
        )
        .unwrap();

        let source = FileArtifactSource::new(temp_dir.path());
        let bytes = source.fetch(ArtifactKind::CurrencyEncoder).await.unwrap();
        assert!(bytes.starts_with(b"{\"type\""));
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileArtifactSource::new(temp_dir.path());

        let err = source.fetch(ArtifactKind::Classifier).await.unwrap_err();
        match err {
            FetchError::Io { path, .. } => assert!(path.ends_with("trained_model.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
