//! Error types for workspace operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Errors a `Workspace` implementation can raise.
///
/// Note what is deliberately absent: a failing compile or test command is
/// NOT an error here, it's a successful `exec` with a non-zero `exit_code`.
/// These variants are for infrastructure failures — the container/process
/// itself misbehaving.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command infra error: {0}")]
    CommandInfra(String),

    #[error("workspace provisioner unreachable: {0}")]
    ProvisionerUnreachable(String),
}
