//! Error types for the search tree and beam-search driver.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchTreeError>;

#[derive(Debug, Error)]
pub enum SearchTreeError {
    #[error("no solution found within max_depth={0}")]
    MaxDepthExceeded(usize),

    #[error("llm call failed: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("workspace operation failed: {0}")]
    Workspace(#[from] workspace::WorkspaceError),
}
