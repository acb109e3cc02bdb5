//! The `Workspace` contract: a mutable, cloneable, sandboxed filesystem view
//! with command execution and diffing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// The outcome of a single `exec` call.
///
/// A timing out command or a dead container surfaces here as a non-zero
/// `exit_code`, never as a raised [`WorkspaceError`](crate::error::WorkspaceError) —
/// callers (beam-search eval predicates in particular) only ever branch on
/// exit code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A directory entry as reported by `ls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    pub path: String,
    pub is_dir: bool,
}

/// A disposable, sandboxed container view.
///
/// `clone()` must produce a fully independent instance: mutating the clone
/// never affects the parent, and vice versa. `diff()` must be stable for a
/// given final state regardless of the sequence of operations that produced
/// it.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Produce an independent copy sharing no mutable state with `self`.
    fn clone_workspace(&self) -> Box<dyn Workspace>;

    async fn read_file(&self, path: &str) -> Result<String>;

    async fn write_file(&self, path: &str, content: &str) -> Result<()>;

    async fn exec(&self, cmd: &str) -> Result<ExecResult>;

    /// Unified diff of the current file set against the workspace's initial
    /// snapshot (the template as delivered, or the client's known baseline —
    /// callers decide which snapshot to diff against by constructing the
    /// workspace with the appropriate `start` files).
    async fn diff(&self) -> Result<String>;

    async fn ls(&self, path: &str) -> Result<Vec<DirEntry>>;
}

/// All files currently tracked by a workspace, path → content.
///
/// Not part of the core trait (a real container-backed workspace may not be
/// able to enumerate this cheaply), but `MemoryWorkspace` exposes it for
/// tests and for actors merging a trajectory's file deltas.
pub type FileMap = BTreeMap<String, String>;
