//! Room event types
//!
//! Events are what members observe: membership-count updates, file
//! availability, the private file replay a joiner receives, and private
//! error replies. The serde representation is the wire format transport
//! adapters forward verbatim, tagged by event name.

use serde::{Deserialize, Serialize};

use crate::registry::{FileRecord, RoomCode};

/// An event delivered to one or more room members
///
/// Cheap to clone; fan-out clones one event per receiving connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Membership changed; broadcast to the whole room
    RoomUpdate { message: String, count: usize },

    /// Replay of the room's current files; unicast to a joining connection
    InitialFiles { files: Vec<FileRecord> },

    /// A new file was uploaded; broadcast to the whole room
    FileAvailable { file: FileRecord },

    /// Request failed; unicast to the originating connection
    Error { message: String },
}

impl RoomEvent {
    /// Membership update after a join
    pub fn user_joined(count: usize) -> Self {
        RoomEvent::RoomUpdate {
            message: "A user joined the room.".to_string(),
            count,
        }
    }

    /// Membership update after a departure
    pub fn user_left(count: usize) -> Self {
        RoomEvent::RoomUpdate {
            message: "A user left the room.".to_string(),
            count,
        }
    }

    /// Error reply for a join against a dead or mistyped code
    pub fn unknown_room(code: &RoomCode) -> Self {
        RoomEvent::Error {
            message: format!("Room {} does not exist.", code),
        }
    }
}
