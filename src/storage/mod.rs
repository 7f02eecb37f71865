//! Blob storage
//!
//! The coordination core treats file bytes as opaque blobs behind a
//! put/get/delete interface keyed by storage key. Two implementations ship:
//! a filesystem store for durable-enough deployments and an in-memory store
//! for tests and demos. Transports needing S3 or similar implement
//! [`BlobStore`] themselves.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;

pub use error::BlobStoreError;
pub use fs::FsBlobStore;
pub use key::{storage_key_for, validate_storage_key, KEY_DELIMITER};
pub use memory::MemoryBlobStore;

use bytes::Bytes;

/// Durable byte storage addressed by storage key
///
/// `put` must make the bytes readable under `key` before returning, and must
/// overwrite an existing blob under the same key. `delete` of a missing key
/// is not an error.
#[allow(async_fn_in_trait)]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a key, replacing any existing blob
    async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobStoreError>;

    /// Read the bytes stored under a key
    async fn get(&self, key: &str) -> Result<Bytes, BlobStoreError>;

    /// Remove the blob under a key, if present
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}
