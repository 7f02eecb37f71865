//! Room registry implementation
//!
//! The central registry is the single authoritative owner of room lifetime:
//! rooms exist in the map iff they were created and not yet deleted, and a
//! room is reaped the instant its member count reaches zero.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::session::ConnectionId;

use super::code::{generate_unique_code, RoomCode, DEFAULT_CODE_LENGTH};
use super::entry::RoomEntry;
use super::error::RegistryError;
use super::file::FileRecord;

/// Outcome of a member departure
///
/// A departure either leaves the room alive with the remaining count, or
/// deletes the room and hands back its final file list so the caller can
/// purge blobs after the registry lock is released.
#[derive(Debug)]
pub enum Departure {
    /// Members remain; carries the new member count
    Remaining(usize),
    /// The departing member was the last one; the room was removed
    Deleted(Vec<FileRecord>),
}

/// Central registry for all live rooms
///
/// Thread-safe via a single coarse `RwLock`, which doubles as the mutual
/// exclusion domain required for the compound operations: code generation +
/// insert in [`create_room`](Self::create_room) and remove + conditional
/// delete in [`depart`](Self::depart) each happen under one write-lock
/// acquisition. No operation performs I/O while holding the lock.
pub struct RoomRegistry {
    /// Map of room code to room entry
    rooms: RwLock<HashMap<RoomCode, RoomEntry>>,

    /// Length of generated room codes
    code_length: usize,
}

impl RoomRegistry {
    /// Create a new registry with the default code length
    pub fn new() -> Self {
        Self::with_code_length(DEFAULT_CODE_LENGTH)
    }

    /// Create a new registry generating codes of the given length
    pub fn with_code_length(code_length: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            code_length,
        }
    }

    /// Get the configured code length
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Create a new, empty room and return its freshly generated code
    ///
    /// Generation and insertion happen under the same write lock, so two
    /// concurrent creations can never share a code. Always succeeds.
    pub async fn create_room(&self) -> RoomCode {
        let mut rooms = self.rooms.write().await;
        let code = generate_unique_code(&rooms, self.code_length);
        rooms.insert(code.clone(), RoomEntry::new());

        tracing::info!(room = %code, total_rooms = rooms.len(), "Room created");
        code
    }

    /// Check whether a code denotes a live room
    pub async fn room_exists(&self, code: &RoomCode) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    /// Add a connection to a room's members, returning the new member count
    ///
    /// Idempotent: re-adding an existing member overwrites its label.
    pub async fn add_member(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
        label: impl Into<String>,
    ) -> Result<usize, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        let count = entry.upsert_member(conn, label.into());

        tracing::info!(room = %code, conn = conn.0, count, "Member added");
        Ok(count)
    }

    /// Remove a connection from a room's members, returning the remaining count
    ///
    /// Removing a connection that is not a member leaves the room unchanged.
    /// A returned count of zero is the caller's trigger to delete the room;
    /// the registry never deletes implicitly here, so the caller can still
    /// read the file list before the room state disappears. Disconnect paths
    /// that need remove-and-delete as one step use [`depart`](Self::depart).
    pub async fn remove_member(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<usize, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        let count = entry.remove_member(conn);

        tracing::debug!(room = %code, conn = conn.0, count, "Member removed");
        Ok(count)
    }

    /// Remove a member and delete the room if it became empty, atomically
    ///
    /// The remove and the conditional delete happen under one write-lock
    /// acquisition, so a join or upload can never interleave between the
    /// count reaching zero and the room disappearing. On deletion the final
    /// file list is returned for blob cleanup, performed by the caller after
    /// this method returns.
    pub async fn depart(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<Departure, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        let count = entry.remove_member(conn);
        if count > 0 {
            tracing::debug!(room = %code, conn = conn.0, count, "Member departed");
            return Ok(Departure::Remaining(count));
        }

        let files = match rooms.remove(code) {
            Some(entry) => {
                tracing::info!(
                    room = %code,
                    conn = conn.0,
                    files = entry.files.len(),
                    age_secs = entry.created_at.elapsed().as_secs(),
                    "Room empty after departure, deleted"
                );
                entry.files
            }
            None => Vec::new(),
        };

        Ok(Departure::Deleted(files))
    }

    /// Append a file record to a room
    ///
    /// A record whose storage key already exists replaces the old one in
    /// place (overwrite-by-key), keeping replay order stable.
    pub async fn append_file(
        &self,
        code: &RoomCode,
        record: FileRecord,
    ) -> Result<(), RegistryError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        entry.insert_file(record);

        tracing::debug!(room = %code, files = entry.file_count(), "File appended");
        Ok(())
    }

    /// Get a room's file list in upload order
    pub async fn list_files(&self, code: &RoomCode) -> Result<Vec<FileRecord>, RegistryError> {
        let rooms = self.rooms.read().await;
        let entry = rooms
            .get(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        Ok(entry.files.clone())
    }

    /// Get a snapshot of a room's current members
    pub async fn members(&self, code: &RoomCode) -> Result<Vec<ConnectionId>, RegistryError> {
        let rooms = self.rooms.read().await;
        let entry = rooms
            .get(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        Ok(entry.members.keys().copied().collect())
    }

    /// Get a room's member count
    pub async fn member_count(&self, code: &RoomCode) -> Result<usize, RegistryError> {
        let rooms = self.rooms.read().await;
        let entry = rooms
            .get(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        Ok(entry.member_count())
    }

    /// Delete a room, returning its final file list for blob cleanup
    pub async fn delete_room(&self, code: &RoomCode) -> Result<Vec<FileRecord>, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .remove(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        tracing::info!(
            room = %code,
            files = entry.files.len(),
            age_secs = entry.created_at.elapsed().as_secs(),
            "Room deleted"
        );
        Ok(entry.files)
    }

    /// Get the total number of live rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
