//! Registry error types
//!
//! Error types for room registry operations.

use super::code::RoomCode;

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Room code does not denote a live room (stale or invalid code)
    RoomNotFound(RoomCode),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::RoomNotFound(code) => write!(f, "Room not found: {}", code),
        }
    }
}

impl std::error::Error for RegistryError {}
