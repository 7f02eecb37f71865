//! Room-coordination core for ephemeral, code-based file sharing
//!
//! One user creates a room and gets a short shareable code; others join with
//! it; any member uploads a file and every current member is told it is
//! available; when the last member leaves, the room and its files are
//! purged. This crate is that coordination core — the in-memory room
//! registry, the connection-to-room session tracking, the broadcast
//! protocol, and the reference-counted cleanup. HTTP/WebSocket transport,
//! page rendering, and the physical byte transfer live outside it.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use roomdrop::{MemoryBlobStore, RoomService};
//!
//! # async fn run() -> roomdrop::Result<()> {
//! let service = RoomService::new(MemoryBlobStore::new());
//!
//! let code = service.create_room().await;
//! let (conn, _events) = service.connect().await;
//! service.join(conn, code.as_str()).await?;
//!
//! let record = service
//!     .upload(code.as_str(), "notes.txt", Bytes::from_static(b"hi"))
//!     .await?;
//! let _bytes = service.download(&record.storage_key).await?;
//!
//! service.disconnect(conn).await; // Last member out: room and blobs purged
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//!   transport adapter(s)
//!          │  connect / join / upload / download / disconnect
//!          ▼
//!     RoomService ──────► BlobStore (fs / memory / yours)
//!       │     │     │
//!       │     │     └──► BroadcastCoordinator ──► per-connection channels
//!       │     └────────► SessionTracker  (conn → room)
//!       └──────────────► RoomRegistry    (room → members, files)
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;
pub mod session;
pub mod storage;

pub use broadcast::{BroadcastCoordinator, EventSender, RoomEvent};
pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use registry::{Departure, FileRecord, RegistryError, RoomCode, RoomRegistry};
pub use service::RoomService;
pub use session::{ConnectionId, SessionTracker};
pub use storage::{BlobStore, BlobStoreError, FsBlobStore, MemoryBlobStore};
