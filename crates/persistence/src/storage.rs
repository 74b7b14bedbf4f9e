//! Local filesystem storage for media files.

use async_trait::async_trait;
use domain::error::{StoreError, StoreResult};
use domain::store::MediaStorage;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Stores media files below a root directory, addressed by relative path.
#[derive(Debug, Clone)]
pub struct FsMediaStorage {
    root: PathBuf,
}

impl FsMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path, rejecting anything that would escape the root.
    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::Backend(format!("Invalid media path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!(path = %target.display(), size = bytes.len(), "Media file written");
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::read(&target).await?)
    }

    async fn delete(&self, path: &str) -> StoreResult<bool> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsMediaStorage::new(dir.path());

        storage
            .write("variants/abc/thumbnail.png", b"png-bytes")
            .await
            .unwrap();
        assert!(dir.path().join("variants/abc/thumbnail.png").exists());
        assert_eq!(
            storage.read("variants/abc/thumbnail.png").await.unwrap(),
            b"png-bytes"
        );

        assert!(storage.delete("variants/abc/thumbnail.png").await.unwrap());
        assert!(!storage.delete("variants/abc/thumbnail.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsMediaStorage::new(dir.path());
        assert!(matches!(
            storage.read("originals/missing.png").await,
            Err(StoreError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsMediaStorage::new(dir.path());
        for path in ["../etc/passwd", "/etc/passwd", "", "originals/../../x"] {
            assert!(
                matches!(storage.write(path, b"x").await, Err(StoreError::Backend(_))),
                "{} should be rejected",
                path
            );
        }
    }
}
