//! Error types for the per-request session driver.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("tool processor error: {0}")]
    Processor(#[from] tool_processor::ProcessorError),

    #[error("fsm error: {0}")]
    Fsm(#[from] fsm_core::FsmError),

    #[error("snapshot store error: {0}")]
    Snapshot(#[from] fsm_checkpoint::CheckpointError),

    #[error("workspace error: {0}")]
    Workspace(#[from] workspace::WorkspaceError),

    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),
}
