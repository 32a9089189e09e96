//! Object storage for uploaded photos.
//!
//! [`LocalObjectStore`] writes objects below `<root>/<bucket>/` and serves
//! them from a public base URL. Object paths are relative and may not climb
//! out of the bucket.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object path '{0}'")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A bucket-scoped object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Public URL an object is served from.
    fn public_url(&self, path: &str) -> String;
}

/// [`ObjectStore`] on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    bucket_dir: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl AsRef<Path>, bucket: &str, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            bucket_dir: root.as_ref().join(bucket),
            public_base_url: format!("{}/{bucket}", public_base_url.trim_end_matches('/')),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(path, content_type, size = bytes.len(), "Object stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}
