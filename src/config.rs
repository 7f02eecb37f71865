//! Service configuration

use crate::registry::DEFAULT_CODE_LENGTH;

/// Configuration options for the room service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Length of generated room codes
    pub code_length: usize,

    /// Display label for members that join without one
    pub default_label: String,

    /// Maximum upload size in bytes (0 = unlimited)
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            default_label: "Anonymous".to_string(),
            max_upload_bytes: 0, // Unlimited
        }
    }
}

impl ServiceConfig {
    /// Set the room code length
    pub fn code_length(mut self, length: usize) -> Self {
        self.code_length = length.max(1);
        self
    }

    /// Set the default member label
    pub fn default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Set the maximum upload size (0 = unlimited)
    pub fn max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }
}
