//! Service error types
//!
//! No error here is process-fatal: every failure is either reported back to
//! the originating connection or tolerated where the design says so
//! (teardown blob deletes, broadcasts into empty rooms).

use crate::registry::{RegistryError, RoomCode};
use crate::storage::BlobStoreError;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Error type for room service operations
#[derive(Debug)]
pub enum ServiceError {
    /// Room code is stale or was never valid
    RoomNotFound(RoomCode),
    /// A required input was empty or absent
    MissingInput(&'static str),
    /// Download key does not match the `<code>_<name>` shape
    MalformedKey(String),
    /// Upload exceeds the configured size limit
    UploadTooLarge { size: usize, limit: usize },
    /// Blob store failure (upload writes propagate; teardown deletes do not)
    BlobStore(BlobStoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::RoomNotFound(code) => write!(f, "Room {} does not exist.", code),
            ServiceError::MissingInput(what) => write!(f, "Missing input: {}", what),
            ServiceError::MalformedKey(key) => write!(f, "Malformed storage key: {}", key),
            ServiceError::UploadTooLarge { size, limit } => {
                write!(f, "Upload of {} bytes exceeds limit of {} bytes", size, limit)
            }
            ServiceError::BlobStore(e) => write!(f, "Blob store failure: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::BlobStore(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for ServiceError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::RoomNotFound(code) => ServiceError::RoomNotFound(code),
        }
    }
}

impl From<BlobStoreError> for ServiceError {
    fn from(e: BlobStoreError) -> Self {
        ServiceError::BlobStore(e)
    }
}
