//! Error types for checkpoint/snapshot storage operations.

use thiserror::Error;

/// Result type for checkpoint/snapshot operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur while persisting or loading a snapshot.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("snapshot not found: trace_id={trace_id} key={key}")]
    NotFound { trace_id: String, key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
