//! Storage key derivation and validation
//!
//! Keys are opaque to callers except for one contractual shape: the room
//! code as a prefix, separated by a delimiter. That prefix is used only as a
//! cheap validity pre-check on download, before any store access.

use crate::registry::{RoomCode, CODE_ALPHABET};

/// Separator between the room-code prefix and the display name
pub const KEY_DELIMITER: char = '_';

/// Derive the storage key for a file uploaded to a room
///
/// Deterministic over `(code, display_name)`, so re-uploading the same name
/// to the same room yields the same key (overwrite-by-key semantics).
pub fn storage_key_for(code: &RoomCode, display_name: &str) -> String {
    format!("{}{}{}", code, KEY_DELIMITER, display_name)
}

/// Check that a key has the `<code>_<name>` shape
///
/// The prefix must be exactly `code_length` characters from the room-code
/// alphabet and the remainder non-empty. This rejects malformed download
/// requests without touching the blob store; it does not prove the room is
/// still live.
pub fn validate_storage_key(key: &str, code_length: usize) -> bool {
    let Some((prefix, rest)) = key.split_once(KEY_DELIMITER) else {
        return false;
    };

    prefix.len() == code_length
        && prefix.bytes().all(|b| CODE_ALPHABET.contains(&b))
        && !rest.is_empty()
}
