//! Artifact sinks.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::SinkError;

/// Persists a named blob and returns a retrievable reference to it.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, SinkError>;
}

/// Filesystem sink: artifacts land in one directory, references are
/// URL-style paths under a public prefix.
pub struct FsArtifactSink {
    dir: PathBuf,
    public_prefix: String,
}

impl FsArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: "/artifacts".to_string(),
        }
    }

    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "artifact persisted");
        Ok(format!("{}/{}", self.public_prefix.trim_end_matches('/'), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_and_returns_reference() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());

        let reference = sink.persist("s1_send_20250101.png", b"png").await.unwrap();
        assert_eq!(reference, "/artifacts/s1_send_20250101.png");
        assert!(dir.path().join("s1_send_20250101.png").exists());
    }
}
