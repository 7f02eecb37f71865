//! Per-room state stored in the registry

use std::collections::HashMap;
use std::time::Instant;

use crate::session::ConnectionId;

use super::file::FileRecord;

/// Entry for a single room in the registry
///
/// `members` maps each joined connection to its display label. `files` keeps
/// insertion (upload) order, which is also the replay order for new joiners.
pub struct RoomEntry {
    /// Joined connections and their display labels
    pub(super) members: HashMap<ConnectionId, String>,

    /// Uploaded files in upload order
    pub(super) files: Vec<FileRecord>,

    /// When the room was created
    pub created_at: Instant,
}

impl RoomEntry {
    /// Create an empty room entry
    pub(super) fn new() -> Self {
        Self {
            members: HashMap::new(),
            files: Vec::new(),
            created_at: Instant::now(),
        }
    }

    /// Get the number of members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Get the number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Add or relabel a member, returning the new member count
    pub(super) fn upsert_member(&mut self, conn: ConnectionId, label: String) -> usize {
        self.members.insert(conn, label);
        self.members.len()
    }

    /// Remove a member if present, returning the remaining count
    ///
    /// Removing a connection that never joined leaves the entry unchanged.
    pub(super) fn remove_member(&mut self, conn: ConnectionId) -> usize {
        self.members.remove(&conn);
        self.members.len()
    }

    /// Append a file record, overwriting in place on storage-key collision
    ///
    /// Two uploads with the same display name in one room map to the same
    /// storage key; the second replaces the first without disturbing replay
    /// order.
    pub(super) fn insert_file(&mut self, record: FileRecord) {
        if let Some(existing) = self
            .files
            .iter_mut()
            .find(|f| f.storage_key == record.storage_key)
        {
            *existing = record;
        } else {
            self.files.push(record);
        }
    }
}
