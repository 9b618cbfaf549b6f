//! Error types for procvision-adapter.

use thiserror::Error;

/// Main error type for all adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// I/O error on the frame stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error (malformed frame, missing field, unexpected type).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Length prefix exceeds the configured payload ceiling.
    #[error("Frame length {length} exceeds maximum {max}")]
    FrameTooLarge { length: u32, max: u32 },

    /// Stream closed in the middle of a frame.
    #[error("Stream closed mid-frame")]
    Truncated,
}

/// Result type alias using AdapterError.
pub type Result<T> = std::result::Result<T, AdapterError>;
