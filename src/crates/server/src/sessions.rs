//! The session manager (§4.7): maps `(applicationId, traceId)` to the
//! `AgentSession` currently driving it, so two concurrent requests for the
//! same key don't race on the same FSM. A session started with no prior
//! `agentState` is released as soon as it reaches IDLE/COMPLETE; one
//! restored from a checkpoint is one-shot and released when its stream
//! closes — both cases collapse to "released when `process` returns",
//! since this engine holds no FSM state beyond a single request.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ServerError};

type SessionKey = (String, String);

#[derive(Default)]
pub struct SessionManager {
    active: Mutex<HashSet<SessionKey>>,
}

/// Released automatically when dropped (including by a panicking handler),
/// so a crashed stream still frees the slot instead of wedging the key
/// forever. Owns an `Arc` rather than borrowing, so it can live inside the
/// `'static` task that drives the SSE stream.
pub struct SessionGuard {
    manager: Arc<SessionManager>,
    key: SessionKey,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().expect("session map lock poisoned").len()
    }

    /// Claims `(application_id, trace_id)` for the duration of one request.
    /// Errors if a session for the same key is already in flight.
    pub fn acquire(self: &Arc<Self>, application_id: &str, trace_id: &str) -> Result<SessionGuard> {
        let key = (application_id.to_string(), trace_id.to_string());
        let mut active = self.active.lock().expect("session map lock poisoned");
        if !active.insert(key.clone()) {
            return Err(ServerError::MalformedRequest(format!(
                "session already in flight for applicationId={application_id} traceId={trace_id}"
            )));
        }
        drop(active);
        Ok(SessionGuard { manager: self.clone(), key })
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.active.lock().expect("session map lock poisoned").remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_drop_frees_the_slot() {
        let manager = Arc::new(SessionManager::new());
        {
            let _guard = manager.acquire("a1", "t1").unwrap();
            assert_eq!(manager.active_count(), 1);
        }
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn concurrent_acquire_of_the_same_key_is_rejected() {
        let manager = Arc::new(SessionManager::new());
        let _first = manager.acquire("a1", "t1").unwrap();
        assert!(manager.acquire("a1", "t1").is_err());
    }

    #[test]
    fn distinct_trace_ids_do_not_collide() {
        let manager = Arc::new(SessionManager::new());
        let _first = manager.acquire("a1", "t1").unwrap();
        assert!(manager.acquire("a1", "t2").is_ok());
    }
}
