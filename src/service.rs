//! Room service
//!
//! The single entry point transport adapters call into: one synchronous-to-
//! completion async method per inbound event or request (connect, create,
//! join, upload, download, leave, disconnect). The service keeps the
//! registry, the session tracker, and the broadcast coordinator consistent
//! with each other; transports only serialize their calls in here.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::broadcast::{BroadcastCoordinator, RoomEvent};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::registry::{Departure, FileRecord, RoomCode, RoomRegistry};
use crate::session::{ConnectionId, SessionTracker};
use crate::storage::{storage_key_for, validate_storage_key, BlobStore};

/// Coordination core for room-based file sharing
///
/// Generic over the blob store so transports can back it with the
/// filesystem, memory, or their own storage. All state is in-process; this
/// core assumes it is the single authoritative registry.
pub struct RoomService<B: BlobStore> {
    registry: RoomRegistry,
    sessions: SessionTracker,
    coordinator: BroadcastCoordinator,
    store: B,
    config: ServiceConfig,
    next_connection_id: AtomicU64,
}

impl<B: BlobStore> RoomService<B> {
    /// Create a service with default configuration
    pub fn new(store: B) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    /// Create a service with custom configuration
    pub fn with_config(store: B, config: ServiceConfig) -> Self {
        Self {
            registry: RoomRegistry::with_code_length(config.code_length),
            sessions: SessionTracker::new(),
            coordinator: BroadcastCoordinator::new(),
            store,
            config,
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Get the room registry
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Get the blob store
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Get the service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle a new transport connection
    ///
    /// Allocates a connection id and the channel its events will arrive on.
    /// The connection is not associated with any room until it joins.
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<RoomEvent>) {
        let conn = ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.coordinator.register(conn, tx).await;

        tracing::debug!(conn = conn.0, "Connection established");
        (conn, rx)
    }

    /// Create a new, empty room and return its code
    pub async fn create_room(&self) -> RoomCode {
        self.registry.create_room().await
    }

    /// Join a room with the default display label
    ///
    /// See [`join_as`](Self::join_as).
    pub async fn join(&self, conn: ConnectionId, code_input: &str) -> Result<usize> {
        let label = self.config.default_label.clone();
        self.join_as(conn, code_input, label).await
    }

    /// Join a room under a chosen display label
    ///
    /// Room codes are matched case-insensitively. A connection already in
    /// another room leaves it first (with the usual departure broadcast and
    /// empty-room cleanup). On an unknown code the joiner gets a private
    /// error event and no session is created. On
    /// success the whole room (joiner included) gets the new member count,
    /// then the joiner privately receives the room's files in upload order.
    /// Returns the new member count.
    pub async fn join_as(
        &self,
        conn: ConnectionId,
        code_input: &str,
        label: impl Into<String>,
    ) -> Result<usize> {
        let code = RoomCode::new(code_input);

        // One room per connection: switching rooms departs the old one
        // first, so the tracker and the registry's member sets never
        // diverge. Rejoining the current room just refreshes the label.
        if let Some(prior) = self.sessions.lookup(conn).await {
            if prior != code {
                self.leave(conn).await;
            }
        }

        let count = match self.registry.add_member(&code, conn, label).await {
            Ok(count) => count,
            Err(e) => {
                self.coordinator
                    .notify_one(conn, RoomEvent::unknown_room(&code))
                    .await;
                return Err(e.into());
            }
        };

        self.sessions.bind(conn, code.clone()).await;

        let members = self.registry.members(&code).await.unwrap_or_default();
        self.coordinator
            .notify_many(&members, RoomEvent::user_joined(count))
            .await;

        let files = self.registry.list_files(&code).await.unwrap_or_default();
        self.coordinator
            .notify_one(conn, RoomEvent::InitialFiles { files })
            .await;

        Ok(count)
    }

    /// Store an uploaded file and announce it to the room
    ///
    /// The blob is written before the record is appended or broadcast, so a
    /// member racing a download against the announcement can never observe
    /// an unfinished write. A write failure propagates as a failed upload
    /// with nothing appended and nothing announced.
    pub async fn upload(
        &self,
        code_input: &str,
        display_name: &str,
        data: Bytes,
    ) -> Result<FileRecord> {
        let code = RoomCode::new(code_input);

        if display_name.trim().is_empty() {
            return Err(ServiceError::MissingInput("file name"));
        }
        if data.is_empty() {
            return Err(ServiceError::MissingInput("file bytes"));
        }
        if self.config.max_upload_bytes > 0 && data.len() > self.config.max_upload_bytes {
            return Err(ServiceError::UploadTooLarge {
                size: data.len(),
                limit: self.config.max_upload_bytes,
            });
        }
        if !self.registry.room_exists(&code).await {
            return Err(ServiceError::RoomNotFound(code));
        }

        let storage_key = storage_key_for(&code, display_name);
        let size = data.len();
        self.store.put(&storage_key, data).await?;

        let record = FileRecord::new(display_name, storage_key);
        if let Err(e) = self.registry.append_file(&code, record.clone()).await {
            // Room died between the existence check and the append; reclaim
            // the blob we just wrote so it cannot leak.
            if let Err(delete_err) = self.store.delete(&record.storage_key).await {
                tracing::warn!(
                    key = %record.storage_key,
                    error = %delete_err,
                    "Failed to reclaim blob after room vanished mid-upload"
                );
            }
            return Err(e.into());
        }

        let members = self.registry.members(&code).await.unwrap_or_default();
        self.coordinator
            .notify_many(&members, RoomEvent::FileAvailable {
                file: record.clone(),
            })
            .await;

        tracing::info!(room = %code, name = display_name, bytes = size, "File uploaded");
        Ok(record)
    }

    /// Read a previously uploaded file by its storage key
    ///
    /// Keys that do not match the `<code>_<name>` shape are rejected before
    /// any store access.
    pub async fn download(&self, storage_key: &str) -> Result<Bytes> {
        if !validate_storage_key(storage_key, self.config.code_length) {
            return Err(ServiceError::MalformedKey(storage_key.to_string()));
        }

        Ok(self.store.get(storage_key).await?)
    }

    /// Leave the joined room, if any, keeping the connection alive
    ///
    /// Remaining members get an updated count; if the room emptied it is
    /// deleted and its blobs purged. Returns the room that was left.
    pub async fn leave(&self, conn: ConnectionId) -> Option<RoomCode> {
        let code = self.sessions.unbind(conn).await?;

        match self.registry.depart(&code, conn).await {
            Ok(Departure::Remaining(count)) => {
                let members = self.registry.members(&code).await.unwrap_or_default();
                self.coordinator
                    .notify_many(&members, RoomEvent::user_left(count))
                    .await;
            }
            Ok(Departure::Deleted(files)) => {
                self.purge_blobs(&files).await;
            }
            Err(e) => {
                // Session pointed at a room the registry no longer has;
                // by construction this should be unreachable.
                tracing::warn!(conn = conn.0, room = %code, error = %e, "Stale session binding");
            }
        }

        Some(code)
    }

    /// Handle a transport disconnect
    ///
    /// Leaves the joined room (running empty-room cleanup if this was the
    /// last member) and drops the connection's event channel.
    pub async fn disconnect(&self, conn: ConnectionId) {
        self.leave(conn).await;
        self.coordinator.unregister(conn).await;

        tracing::debug!(conn = conn.0, "Connection closed");
    }

    /// Delete blobs for a torn-down room, best-effort
    ///
    /// One bad file never blocks reclaiming the rest; failures are logged
    /// and swallowed. Runs after the registry lock is released.
    async fn purge_blobs(&self, files: &[FileRecord]) {
        for record in files {
            if let Err(e) = self.store.delete(&record.storage_key).await {
                tracing::warn!(
                    key = %record.storage_key,
                    error = %e,
                    "Failed to delete blob during room teardown"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BlobStoreError, MemoryBlobStore};

    fn service() -> RoomService<MemoryBlobStore> {
        RoomService::new(MemoryBlobStore::new())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<RoomEvent>) -> Vec<RoomEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_create_room_returns_live_code() {
        let svc = service();

        let code = svc.create_room().await;
        assert!(code.is_well_formed(6));
        assert!(svc.registry().room_exists(&code).await);
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let svc = service();
        let (conn, mut rx) = svc.connect().await;

        let result = svc.join(conn, "ZZZZZZ").await;
        assert!(matches!(result, Err(ServiceError::RoomNotFound(_))));

        // Private error reply, exact message
        assert_eq!(
            drain(&mut rx),
            vec![RoomEvent::Error {
                message: "Room ZZZZZZ does not exist.".to_string()
            }]
        );

        // No session was created
        assert!(svc.sessions.lookup(conn).await.is_none());
    }

    #[tokio::test]
    async fn test_join_broadcasts_counts_and_replays_files() {
        let svc = service();
        let code = svc.create_room().await;

        let (conn_a, mut rx_a) = svc.connect().await;
        assert_eq!(svc.join(conn_a, code.as_str()).await.unwrap(), 1);

        let a_events = drain(&mut rx_a);
        assert_eq!(a_events[0], RoomEvent::user_joined(1));
        assert_eq!(a_events[1], RoomEvent::InitialFiles { files: Vec::new() });

        let (conn_b, mut rx_b) = svc.connect().await;
        assert_eq!(svc.join(conn_b, code.as_str()).await.unwrap(), 2);

        // Existing member sees the new count
        assert_eq!(drain(&mut rx_a), vec![RoomEvent::user_joined(2)]);
        // Joiner sees the count plus the (empty) replay
        assert_eq!(
            drain(&mut rx_b),
            vec![
                RoomEvent::user_joined(2),
                RoomEvent::InitialFiles { files: Vec::new() }
            ]
        );
    }

    #[tokio::test]
    async fn test_join_is_case_insensitive() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn, _rx) = svc.connect().await;

        let lowered = code.as_str().to_ascii_lowercase();
        assert_eq!(svc.join(conn, &lowered).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_switching_rooms_departs_the_old_one() {
        let svc = service();
        let room_a = svc.create_room().await;
        let room_b = svc.create_room().await;
        let (conn, mut rx) = svc.connect().await;
        svc.join(conn, room_a.as_str()).await.unwrap();
        drain(&mut rx);

        assert_eq!(svc.join(conn, room_b.as_str()).await.unwrap(), 1);

        // Sole member left room A, so it was reaped; the session follows
        assert!(!svc.registry().room_exists(&room_a).await);
        assert_eq!(svc.sessions.lookup(conn).await, Some(room_b.clone()));
        assert_eq!(svc.sessions.session_count().await, 1);

        svc.disconnect(conn).await;
        assert!(!svc.registry().room_exists(&room_b).await);
        assert_eq!(svc.registry().room_count().await, 0);
    }

    #[tokio::test]
    async fn test_switching_rooms_notifies_remaining_members() {
        let svc = service();
        let room_a = svc.create_room().await;
        let room_b = svc.create_room().await;
        let (conn_a, mut rx_a) = svc.connect().await;
        let (conn_b, _rx_b) = svc.connect().await;
        svc.join(conn_a, room_a.as_str()).await.unwrap();
        svc.join(conn_b, room_a.as_str()).await.unwrap();
        drain(&mut rx_a);

        svc.join(conn_b, room_b.as_str()).await.unwrap();

        assert_eq!(drain(&mut rx_a), vec![RoomEvent::user_left(1)]);
        assert_eq!(svc.registry().member_count(&room_a).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejoining_same_room_keeps_membership() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn, mut rx) = svc.connect().await;
        svc.join(conn, code.as_str()).await.unwrap();
        drain(&mut rx);

        // Same room again: no departure, count unchanged, label refreshed
        assert_eq!(svc.join_as(conn, code.as_str(), "alice").await.unwrap(), 1);
        assert!(svc.registry().room_exists(&code).await);
        assert_eq!(svc.sessions.lookup(conn).await, Some(code.clone()));
    }

    #[tokio::test]
    async fn test_upload_broadcasts_file_available() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn_a, mut rx_a) = svc.connect().await;
        let (conn_b, mut rx_b) = svc.connect().await;
        svc.join(conn_a, code.as_str()).await.unwrap();
        svc.join(conn_b, code.as_str()).await.unwrap();
        drain(&mut rx_a);
        drain(&mut rx_b);

        let record = svc
            .upload(code.as_str(), "doc.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();
        assert_eq!(record.display_name, "doc.pdf");
        assert_eq!(record.storage_key, format!("{}_doc.pdf", code));

        let expected = RoomEvent::FileAvailable {
            file: record.clone(),
        };
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);
    }

    #[tokio::test]
    async fn test_upload_missing_input() {
        let svc = service();
        let code = svc.create_room().await;

        let result = svc.upload(code.as_str(), "", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(ServiceError::MissingInput(_))));

        let result = svc.upload(code.as_str(), "a.txt", Bytes::new()).await;
        assert!(matches!(result, Err(ServiceError::MissingInput(_))));
    }

    #[tokio::test]
    async fn test_upload_unknown_room() {
        let svc = service();

        let result = svc.upload("ZZZZZZ", "a.txt", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(ServiceError::RoomNotFound(_))));
        assert_eq!(svc.store().blob_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_size_limit() {
        let svc = RoomService::with_config(
            MemoryBlobStore::new(),
            ServiceConfig::default().max_upload_bytes(4),
        );
        let code = svc.create_room().await;

        let result = svc
            .upload(code.as_str(), "big.bin", Bytes::from_static(b"12345"))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::UploadTooLarge { size: 5, limit: 4 })
        ));
    }

    #[tokio::test]
    async fn test_upload_overwrites_same_name() {
        let svc = service();
        let code = svc.create_room().await;

        svc.upload(code.as_str(), "a.txt", Bytes::from_static(b"first"))
            .await
            .unwrap();
        let record = svc
            .upload(code.as_str(), "a.txt", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let files = svc.registry().list_files(&code).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(
            svc.download(&record.storage_key).await.unwrap(),
            Bytes::from_static(b"second")
        );
    }

    #[tokio::test]
    async fn test_download_roundtrip() {
        let svc = service();
        let code = svc.create_room().await;
        let data = Bytes::from_static(b"hello");

        let record = svc.upload(code.as_str(), "a.txt", data.clone()).await.unwrap();

        assert_eq!(svc.download(&record.storage_key).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_download_malformed_keys() {
        let svc = service();

        for key in ["nodelimiter", "AB1_short.txt", "abc123_lower.txt", "ABC123_"] {
            let result = svc.download(key).await;
            assert!(
                matches!(result, Err(ServiceError::MalformedKey(_))),
                "key {:?} was not rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_departure_keeps_room_until_empty() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn_a, mut rx_a) = svc.connect().await;
        let (conn_b, mut rx_b) = svc.connect().await;
        svc.join(conn_a, code.as_str()).await.unwrap();
        svc.join(conn_b, code.as_str()).await.unwrap();
        let record = svc
            .upload(code.as_str(), "doc.pdf", Bytes::from_static(b"pdf"))
            .await
            .unwrap();
        drain(&mut rx_a);
        drain(&mut rx_b);

        svc.disconnect(conn_b).await;

        // Remaining member observes the new count
        assert_eq!(drain(&mut rx_a), vec![RoomEvent::user_left(1)]);
        // Room and file survive
        assert!(svc.registry().room_exists(&code).await);
        assert!(svc.download(&record.storage_key).await.is_ok());
    }

    #[tokio::test]
    async fn test_last_departure_deletes_room_and_blobs() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn_a, _rx_a) = svc.connect().await;
        svc.join(conn_a, code.as_str()).await.unwrap();
        let record = svc
            .upload(code.as_str(), "doc.pdf", Bytes::from_static(b"pdf"))
            .await
            .unwrap();

        svc.disconnect(conn_a).await;

        assert!(!svc.registry().room_exists(&code).await);
        assert_eq!(svc.registry().room_count().await, 0);
        assert_eq!(svc.sessions.session_count().await, 0);
        // Storage key now resolves to NotFound
        assert!(matches!(
            svc.download(&record.storage_key).await,
            Err(ServiceError::BlobStore(BlobStoreError::NotFound(_)))
        ));
        // A later creation is free to hand out codes again
        let next = svc.create_room().await;
        assert!(svc.registry().room_exists(&next).await);
    }

    #[tokio::test]
    async fn test_disconnect_without_join() {
        let svc = service();
        let (conn, _rx) = svc.connect().await;

        // No session, nothing to clean up; must not panic
        svc.disconnect(conn).await;
        assert_eq!(svc.coordinator.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_file_events_arrive_in_upload_order() {
        let svc = service();
        let code = svc.create_room().await;
        let (conn, mut rx) = svc.connect().await;
        svc.join(conn, code.as_str()).await.unwrap();
        drain(&mut rx);

        for name in ["one.txt", "two.txt", "three.txt"] {
            svc.upload(code.as_str(), name, Bytes::from_static(b"x"))
                .await
                .unwrap();
        }

        let names: Vec<String> = drain(&mut rx)
            .into_iter()
            .map(|event| match event {
                RoomEvent::FileAvailable { file } => file.display_name,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["one.txt", "two.txt", "three.txt"]);

        // Replay for a late joiner matches the same order
        let (late, mut late_rx) = svc.connect().await;
        svc.join(late, code.as_str()).await.unwrap();
        let events = drain(&mut late_rx);
        match &events[1] {
            RoomEvent::InitialFiles { files } => {
                let replay: Vec<&str> =
                    files.iter().map(|f| f.display_name.as_str()).collect();
                assert_eq!(replay, vec!["one.txt", "two.txt", "three.txt"]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_room_update_count_matches_members() {
        let svc = service();
        let code = svc.create_room().await;

        let mut receivers = Vec::new();
        for expected in 1..=4 {
            let (conn, rx) = svc.connect().await;
            let count = svc.join(conn, code.as_str()).await.unwrap();
            assert_eq!(count, expected);
            assert_eq!(svc.registry().member_count(&code).await.unwrap(), expected);
            receivers.push((conn, rx));
        }

        for (i, (conn, _rx)) in receivers.into_iter().enumerate() {
            svc.disconnect(conn).await;
            let remaining = 4 - i - 1;
            if remaining > 0 {
                assert_eq!(svc.registry().member_count(&code).await.unwrap(), remaining);
            }
        }
        assert!(!svc.registry().room_exists(&code).await);
    }
}
