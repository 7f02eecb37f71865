//! Room registry: authoritative room state and lifecycle
//!
//! The registry owns every live room: its member set, its file list, and the
//! moment it dies. Rooms move through a three-state lifecycle and are reaped
//! purely by their member count reaching zero.
//!
//! # Architecture
//!
//! ```text
//!                        RoomRegistry
//!                 ┌───────────────────────────┐
//!                 │ rooms: HashMap<RoomCode,  │
//!                 │   RoomEntry {             │
//!                 │     members: conn→label,  │
//!                 │     files: [FileRecord],  │
//!                 │   }                       │
//!                 │ >                         │
//!                 └────────────┬──────────────┘
//!                              │
//!        Nonexistent ──create_room──► Active (members > 0)
//!                              ▲          │
//!                              │     depart → count 0
//!                              │          ▼
//!                  (code reusable)     Deleted
//! ```
//!
//! A room exists in the map **iff** it was created and not yet deleted; the
//! session tracker only ever holds non-owning back-references into it.

pub mod code;
pub mod entry;
pub mod error;
pub mod file;
pub mod store;

pub use code::{RoomCode, CODE_ALPHABET, DEFAULT_CODE_LENGTH};
pub use entry::RoomEntry;
pub use error::RegistryError;
pub use file::FileRecord;
pub use store::{Departure, RoomRegistry};
