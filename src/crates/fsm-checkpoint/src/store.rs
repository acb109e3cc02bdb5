//! The [`SnapshotStore`] trait plus an in-memory and a file-backed
//! implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

use crate::error::{CheckpointError, Result};

/// Persists arbitrary JSON blobs keyed by `(trace_id, key)`.
///
/// `AgentSession` uses this for the "enter"/"exit" checkpoint snapshots
/// (§4.6); nothing else in the engine reads or writes through it, so a
/// production deployment can swap in an S3-backed store without touching
/// any other crate.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn put(&self, trace_id: &str, key: &str, value: Value) -> Result<()>;

    async fn get(&self, trace_id: &str, key: &str) -> Result<Option<Value>>;
}

/// An in-memory [`SnapshotStore`], adequate for tests and single-process
/// deployments that don't need snapshots to survive a restart.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    entries: Mutex<HashMap<(String, String), Value>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn put(&self, trace_id: &str, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| CheckpointError::Storage("poisoned lock".into()))?;
        entries.insert((trace_id.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn get(&self, trace_id: &str, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.lock().map_err(|_| CheckpointError::Storage("poisoned lock".into()))?;
        Ok(entries.get(&(trace_id.to_string(), key.to_string())).cloned())
    }
}

/// A JSON-lines file per trace, one line per `put()` call, under a
/// configured directory. `get()` returns the value of the *last* line
/// matching `key` (later puts for the same key shadow earlier ones).
pub struct FileSnapshotStore {
    base_dir: PathBuf,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Record {
    key: String,
    value: Value,
}

impl FileSnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn trace_path(&self, trace_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.jsonl", sanitize(trace_id)))
    }
}

fn sanitize(trace_id: &str) -> String {
    trace_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn put(&self, trace_id: &str, key: &str, value: Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let record = Record { key: key.to_string(), value };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.trace_path(trace_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn get(&self, trace_id: &str, key: &str) -> Result<Option<Value>> {
        let path = self.trace_path(trace_id);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let mut found = None;
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(line)?;
            if record.key == key {
                found = Some(record.value);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trips() {
        let store = InMemorySnapshotStore::new();
        store.put("t1", "enter", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("t1", "enter").await.unwrap(), Some(serde_json::json!({"a": 1})));
        assert_eq!(store.get("t1", "exit").await.unwrap(), None);
        assert_eq!(store.get("other", "enter").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_last_write_wins_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.put("t1", "enter", serde_json::json!(1)).await.unwrap();
        store.put("t1", "exit", serde_json::json!(2)).await.unwrap();
        store.put("t1", "enter", serde_json::json!(3)).await.unwrap();

        assert_eq!(store.get("t1", "enter").await.unwrap(), Some(serde_json::json!(3)));
        assert_eq!(store.get("t1", "exit").await.unwrap(), Some(serde_json::json!(2)));
    }
}
