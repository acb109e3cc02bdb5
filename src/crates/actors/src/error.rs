//! Error types for the concrete code-generation actors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ActorError>;

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("actor search failed: {0}")]
    Search(#[from] search_tree::SearchTreeError),

    #[error("llm error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("workspace error: {0}")]
    Workspace(#[from] workspace::WorkspaceError),
}
