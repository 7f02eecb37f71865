//! File records

use serde::{Deserialize, Serialize};

/// Metadata for one uploaded file
///
/// `display_name` is the original, user-supplied name and is not unique.
/// `storage_key` is globally unique (`<CODE>_<name>`) and is the only name
/// ever used for blob-store access. Immutable once created.
///
/// Wire field names (`name`, `unique_name`) are the ones clients already
/// speak, kept via serde renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Original, user-supplied file name
    #[serde(rename = "name")]
    pub display_name: String,

    /// Globally unique blob-store key
    #[serde(rename = "unique_name")]
    pub storage_key: String,
}

impl FileRecord {
    /// Create a new file record
    pub fn new(display_name: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            storage_key: storage_key.into(),
        }
    }
}
