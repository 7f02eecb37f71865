//! Room codes and code generation
//!
//! Room codes are short, human-shareable identifiers drawn from a fixed
//! uppercase-alphanumeric alphabet. Input is canonicalized to uppercase so
//! lookups are case-insensitive for users.

use std::collections::HashMap;

use rand::Rng;

use super::entry::RoomEntry;

/// Alphabet room codes are sampled from
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default room code length
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Canonical identifier for a room
///
/// Always stored uppercase. A code is unique among live rooms while the room
/// exists and may be reused after the room is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    /// Canonicalize user input into a room code (trimmed, uppercased)
    pub fn new(input: impl AsRef<str>) -> Self {
        Self(input.as_ref().trim().to_ascii_uppercase())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check length and alphabet membership
    pub fn is_well_formed(&self, expected_length: usize) -> bool {
        self.0.len() == expected_length && self.0.bytes().all(|b| CODE_ALPHABET.contains(&b))
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sample codes until one is absent from the live registry map
///
/// Called with the registry write lock held so that generation and insertion
/// are atomic from the caller's perspective. Degenerates to unbounded retry
/// only as the code space (36^length) nears exhaustion.
pub(super) fn generate_unique_code(
    existing: &HashMap<RoomCode, RoomEntry>,
    length: usize,
) -> RoomCode {
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (0..length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        let code = RoomCode(code);
        if !existing.contains_key(&code) {
            return code;
        }
    }
}
