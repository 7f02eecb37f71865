//! In-memory blob store
//!
//! Keeps blobs in a map. Used by tests and demos, and good enough in
//! production for deployments that accept losing files with the process,
//! which ephemeral rooms already do.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use super::error::BlobStoreError;
use super::BlobStore;

/// Blob store backed by a `HashMap`
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of stored blobs
    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobStoreError> {
        if key.is_empty() {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        self.blobs.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}
