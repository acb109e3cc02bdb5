//! Snapshot storage for the agent engine.
//!
//! `fsm-core` machines serialize to a JSON [`Checkpoint`](fsm_core equivalent,
//! re-exported by `fsm-core` itself) on every natural pause; `agent-session`
//! persists those dumps, keyed by `(trace_id, key)`, through the
//! [`SnapshotStore`] trait defined here so the rest of the engine never
//! depends on *where* a snapshot lands (in-memory for tests, a JSON-lines
//! file per trace in a single-process deployment, S3 or similar in
//! production — out of scope for this crate).

pub mod error;
pub mod store;

pub use error::{CheckpointError, Result};
pub use store::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore};
