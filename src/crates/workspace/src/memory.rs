//! `MemoryWorkspace`: an in-memory fake satisfying the [`Workspace`] contract.
//!
//! Used by tests and by any integration exercising the FSM/actors without a
//! real container sandbox. Commands are resolved against a small scripted
//! registry rather than actually spawning a shell, keeping tests
//! deterministic.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, WorkspaceError};
use crate::trait_def::{DirEntry, ExecResult, FileMap, Workspace};

/// A scripted response for one exec command, keyed by exact command string.
#[derive(Debug, Clone)]
pub struct ScriptedCommand {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptedCommand {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { exit_code: 0, stdout: stdout.into(), stderr: String::new() }
    }

    pub fn fail(stderr: impl Into<String>) -> Self {
        Self { exit_code: 1, stdout: String::new(), stderr: stderr.into() }
    }
}

struct Inner {
    start: FileMap,
    files: FileMap,
    commands: BTreeMap<String, ScriptedCommand>,
}

/// An in-memory, cloneable workspace backed by a `BTreeMap<path, content>`.
#[derive(Clone)]
pub struct MemoryWorkspace {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryWorkspace {
    /// Build a workspace whose initial snapshot (diff baseline) is `start`.
    pub fn new(start: FileMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                files: start.clone(),
                start,
                commands: BTreeMap::new(),
            })),
        }
    }

    pub fn empty() -> Self {
        Self::new(FileMap::new())
    }

    /// Script a response for an exact command string. Unscripted commands
    /// return exit code 0 with empty output, matching a no-op shell command.
    pub fn script(&self, cmd: impl Into<String>, response: ScriptedCommand) {
        self.inner
            .lock()
            .expect("memory workspace lock poisoned")
            .commands
            .insert(cmd.into(), response);
    }

    /// Snapshot of every file currently tracked, for merging trajectory deltas.
    pub fn files(&self) -> FileMap {
        self.inner.lock().expect("memory workspace lock poisoned").files.clone()
    }
}

#[async_trait]
impl Workspace for MemoryWorkspace {
    fn clone_workspace(&self) -> Box<dyn Workspace> {
        let inner = self.inner.lock().expect("memory workspace lock poisoned");
        Box::new(MemoryWorkspace {
            inner: Arc::new(Mutex::new(Inner {
                start: inner.start.clone(),
                files: inner.files.clone(),
                commands: inner.commands.clone(),
            })),
        })
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        self.inner
            .lock()
            .expect("memory workspace lock poisoned")
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| WorkspaceError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        self.inner
            .lock()
            .expect("memory workspace lock poisoned")
            .files
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn exec(&self, cmd: &str) -> Result<ExecResult> {
        let inner = self.inner.lock().expect("memory workspace lock poisoned");
        let result = inner.commands.get(cmd).cloned().unwrap_or(ScriptedCommand {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        Ok(ExecResult {
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    async fn diff(&self) -> Result<String> {
        let inner = self.inner.lock().expect("memory workspace lock poisoned");
        Ok(unified_diff(&inner.start, &inner.files))
    }

    async fn ls(&self, path: &str) -> Result<Vec<DirEntry>> {
        let inner = self.inner.lock().expect("memory workspace lock poisoned");
        let prefix = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        let entries = inner
            .files
            .keys()
            .filter(|p| p.starts_with(&prefix))
            .map(|p| DirEntry { path: p.clone(), is_dir: false })
            .collect();
        Ok(entries)
    }
}

/// Render a stable unified diff of `before` against `after` across every
/// path touched in either map, using the `similar` crate's text differ.
fn unified_diff(before: &FileMap, after: &FileMap) -> String {
    let mut paths: Vec<&String> = before.keys().chain(after.keys()).collect();
    paths.sort();
    paths.dedup();

    let mut out = String::new();
    for path in paths {
        let old = before.get(path).map(String::as_str).unwrap_or("");
        let new = after.get(path).map(String::as_str).unwrap_or("");
        if old == new {
            continue;
        }
        let diff = similar::TextDiff::from_lines(old, new);
        out.push_str(
            &diff
                .unified_diff()
                .header(&format!("a/{}", path), &format!("b/{}", path))
                .to_string(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clone_is_independent() {
        let ws = MemoryWorkspace::empty();
        ws.write_file("a.txt", "original").await.unwrap();

        let clone = ws.clone_workspace();
        clone.write_file("a.txt", "mutated").await.unwrap();

        assert_eq!(ws.read_file("a.txt").await.unwrap(), "original");
        assert_eq!(clone.read_file("a.txt").await.unwrap(), "mutated");
    }

    #[tokio::test]
    async fn diff_is_empty_for_unchanged_workspace() {
        let mut start = FileMap::new();
        start.insert("a.txt".to_string(), "hello".to_string());
        let ws = MemoryWorkspace::new(start);

        assert_eq!(ws.diff().await.unwrap(), "");
    }

    #[tokio::test]
    async fn diff_reflects_written_files() {
        let ws = MemoryWorkspace::empty();
        ws.write_file("a.txt", "hello\n").await.unwrap();

        let diff = ws.diff().await.unwrap();
        assert!(diff.contains("a.txt"));
        assert!(diff.contains("+hello"));
    }

    #[tokio::test]
    async fn exec_returns_scripted_response() {
        let ws = MemoryWorkspace::empty();
        ws.script("npm run typecheck", ScriptedCommand::ok("no errors"));

        let result = ws.exec("npm run typecheck").await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "no errors");
    }

    #[tokio::test]
    async fn exec_unscripted_command_defaults_to_success() {
        let ws = MemoryWorkspace::empty();
        let result = ws.exec("echo hi").await.unwrap();
        assert!(result.success());
    }
}
