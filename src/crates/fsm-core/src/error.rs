//! Error types for the hierarchical state machine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsmError>;

#[derive(Debug, Error)]
pub enum FsmError {
    /// A spawned `invoke` task panicked or was otherwise not joinable
    /// (never a cancellation — cancelled invokes are simply dropped, see
    /// `Machine::cancel_pending`).
    #[error("invoke task join error: {0}")]
    InvokeJoin(String),

    #[error("checkpoint (de)serialization error: {0}")]
    Checkpoint(#[from] serde_json::Error),
}
