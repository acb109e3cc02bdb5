//! Error types for the FSM tool-call processor.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessorError>;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("fsm error: {0}")]
    Fsm(#[from] fsm_core::FsmError),
}
