//! Filesystem-backed blob store
//!
//! Blobs live as flat files under a base directory, one file per storage
//! key. Writes land in a temp subdirectory first and are renamed into place
//! so a reader can never observe a half-written blob. Keys cannot contain
//! path separators, so no key can ever address the temp subdirectory.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::BlobStoreError;
use super::BlobStore;

/// Subdirectory for in-flight writes, outside the key namespace
const TEMP_DIR: &str = ".tmp";

/// Blob store writing one file per key under a base directory
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `base_path`, creating the directory if needed
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, BlobStoreError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(base_path.join(TEMP_DIR))?;
        Ok(Self { base_path })
    }

    /// Get the base directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path, rejecting anything that could escape the base
    fn blob_path(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
        {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobStoreError> {
        let path = self.blob_path(key)?;

        // Write into the temp subdirectory first, then rename for atomicity.
        // The random suffix keeps concurrent writes of one key apart; the
        // subdirectory keeps temp files out of the key namespace entirely.
        let temp_path = self
            .base_path
            .join(TEMP_DIR)
            .join(format!("{}.{:08x}", key, rand::random::<u32>()));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await?;

        tracing::debug!(key, bytes = data.len(), "Blob written");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        let path = self.blob_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = self.blob_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key, "Blob deleted");
                Ok(())
            }
            // Already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
