//! Connection sessions
//!
//! A session is the live association between a transport connection and the
//! room it has joined. Connections without a session entry are not members of
//! any room.

pub mod tracker;

pub use tracker::SessionTracker;

/// Unique identifier for a single transport connection
///
/// Allocated by the service from a monotonically increasing counter; never
/// reused within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
