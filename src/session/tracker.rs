//! Session tracker
//!
//! Pure bookkeeping for the connection-to-room relation, giving disconnect
//! handling an O(1) path from a connection id to the room it must leave. The
//! tracker does no validation against the registry; callers bind only after a
//! successful member add and unbind with the matching member removal.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::registry::RoomCode;

use super::ConnectionId;

/// Mapping of connection id to joined room code
///
/// Holds exactly one entry per currently joined connection. The stored code
/// is a non-owning back-reference; room lifetime belongs to the registry.
pub struct SessionTracker {
    sessions: RwLock<HashMap<ConnectionId, RoomCode>>,
}

impl SessionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Associate a connection with a room
    ///
    /// Rebinding an already-bound connection overwrites the prior entry;
    /// keeping that consistent with the registry is the caller's job.
    pub async fn bind(&self, conn: ConnectionId, code: RoomCode) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(conn, code);

        tracing::debug!(conn = conn.0, sessions = sessions.len(), "Session bound");
    }

    /// Remove and return a connection's binding, if any
    pub async fn unbind(&self, conn: ConnectionId) -> Option<RoomCode> {
        let mut sessions = self.sessions.write().await;
        let code = sessions.remove(&conn);

        if let Some(ref code) = code {
            tracing::debug!(conn = conn.0, room = %code, "Session unbound");
        }
        code
    }

    /// Look up the room a connection has joined, if any
    pub async fn lookup(&self, conn: ConnectionId) -> Option<RoomCode> {
        self.sessions.read().await.get(&conn).cloned()
    }

    /// Get the number of bound sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
