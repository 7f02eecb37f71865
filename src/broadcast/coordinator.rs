//! Broadcast coordinator
//!
//! Fan-out of room events to connections. Each connection registers an
//! unbounded mpsc sender on connect; delivery to a single connection always
//! preserves send order, which is what gives members a causally consistent
//! view of serialized room operations.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use crate::session::ConnectionId;

use super::event::RoomEvent;

/// Per-connection sender for outbound room events
pub type EventSender = mpsc::UnboundedSender<RoomEvent>;

/// Routes events to the connections that should observe them
///
/// Holds one outbound channel per live connection. A connection whose
/// receiver is gone is tolerated on delivery; its entry is dropped when the
/// service unregisters it on disconnect.
pub struct BroadcastCoordinator {
    senders: RwLock<HashMap<ConnectionId, EventSender>>,
}

impl BroadcastCoordinator {
    /// Create an empty coordinator
    pub fn new() -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection's outbound channel
    pub async fn register(&self, conn: ConnectionId, sender: EventSender) {
        let mut senders = self.senders.write().await;
        senders.insert(conn, sender);

        tracing::debug!(conn = conn.0, connections = senders.len(), "Connection registered");
    }

    /// Drop a connection's outbound channel
    pub async fn unregister(&self, conn: ConnectionId) {
        let mut senders = self.senders.write().await;
        senders.remove(&conn);

        tracing::debug!(conn = conn.0, connections = senders.len(), "Connection unregistered");
    }

    /// Deliver an event to a single connection
    ///
    /// Unknown or already-disconnected targets are a no-op, not an error.
    pub async fn notify_one(&self, conn: ConnectionId, event: RoomEvent) {
        let senders = self.senders.read().await;

        if let Some(sender) = senders.get(&conn) {
            if sender.send(event).is_err() {
                tracing::debug!(conn = conn.0, "Receiver gone, event dropped");
            }
        }
    }

    /// Deliver one event to every listed connection
    ///
    /// An empty member list (race with a concurrent departure) is a no-op.
    pub async fn notify_many(&self, conns: &[ConnectionId], event: RoomEvent) {
        let senders = self.senders.read().await;

        for conn in conns {
            if let Some(sender) = senders.get(conn) {
                if sender.send(event.clone()).is_err() {
                    tracing::debug!(conn = conn.0, "Receiver gone, event dropped");
                }
            }
        }
    }

    /// Get the number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }
}

impl Default for BroadcastCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
