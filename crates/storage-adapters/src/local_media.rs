//! # Local media
//!
//! Filesystem implementation of `MediaStorage`. Objects live under a root
//! directory at their logical path and are served by the binary from the
//! configured public URL prefix.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use domains::{DomainError, MediaStorage, Result};
use tokio::fs;

pub struct LocalMediaStorage {
    /// Root directory for all uploads (e.g., "./data/media")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/media")
    url_prefix: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root_path: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Resolves a logical path under the root. Absolute paths and `..`
    /// segments are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(DomainError::Upload(format!("invalid media path '{path}'")));
        }
        Ok(self.root_path.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
        let target = self.resolve(path)?;

        // 1. Ensure the directory exists
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| DomainError::Upload(err.to_string()))?;
        }

        // 2. Write, replacing any previous object at this path
        fs::write(&target, &data)
            .await
            .map_err(|err| DomainError::Upload(err.to_string()))?;
        tracing::debug!(%path, content_type, bytes = data.len(), "media stored");

        Ok(format!("{}/{}", self.url_prefix, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_under_root_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let media = LocalMediaStorage::new(dir.path(), "/media/");

        let url = media
            .upload("avatars/u1.png", Bytes::from_static(b"first"), "image/png")
            .await
            .unwrap();
        media
            .upload("avatars/u1.png", Bytes::from_static(b"second"), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "/media/avatars/u1.png");
        let stored = std::fs::read(dir.path().join("avatars/u1.png")).unwrap();
        assert_eq!(stored, b"second");
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let media = LocalMediaStorage::new(dir.path(), "/media");

        for path in ["../etc/passwd", "/abs.png", "items/../../x.png", ""] {
            let err = media.upload(path, Bytes::new(), "image/png").await.unwrap_err();
            assert!(matches!(err, DomainError::Upload(_)), "{path} should be rejected");
        }
    }
}
