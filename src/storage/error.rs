//! Storage error types

/// Error type for blob store operations
#[derive(Debug)]
pub enum BlobStoreError {
    /// No blob stored under the given key
    NotFound(String),
    /// Key cannot address a blob (empty, or would escape the store)
    InvalidKey(String),
    /// Underlying I/O failure
    Io(std::io::Error),
}

impl std::fmt::Display for BlobStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobStoreError::NotFound(key) => write!(f, "Blob not found: {}", key),
            BlobStoreError::InvalidKey(key) => write!(f, "Invalid blob key: {}", key),
            BlobStoreError::Io(e) => write!(f, "Blob store I/O error: {}", e),
        }
    }
}

impl std::error::Error for BlobStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobStoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobStoreError {
    fn from(e: std::io::Error) -> Self {
        BlobStoreError::Io(e)
    }
}
