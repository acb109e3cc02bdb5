//! [`Machine`]: the hierarchical state machine runtime (§4.3).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::checkpoint::Checkpoint;
use crate::error::{FsmError, Result};
use crate::state::{find_path, ActionFn, StateId, StateNode, StatePath};

struct PendingInvoke {
    state_path: StatePath,
    handle: tokio::task::JoinHandle<std::result::Result<serde_json::Value, serde_json::Value>>,
}

/// A running hierarchical state machine over context type `C`.
///
/// `states` holds the top-level children of the machine's implicit root;
/// `root_on` is the root's own `on` map, consulted last in the
/// deepest-to-shallowest walk (§4.3 step 1) — this is where a catch-all
/// `"any state -> on_error -> FAILURE"` transition lives (§4.4).
pub struct Machine<C> {
    states: Vec<StateNode<C>>,
    root_on: HashMap<String, StatePath>,
    context: C,
    stack_path: StatePath,
    pending: Option<PendingInvoke>,
}

impl<C> Machine<C> {
    /// Construct a fresh machine. The initial `stack_path` is the first
    /// leaf reachable by always descending into a state's first child
    /// (§4.3 "Initial state") — no entry actions fire for it.
    pub fn new(states: Vec<StateNode<C>>, root_on: HashMap<String, StatePath>, context: C) -> Self {
        let stack_path = Self::initial_path(&states);
        Self { states, root_on, context, stack_path, pending: None }
    }

    fn initial_path(states: &[StateNode<C>]) -> StatePath {
        let mut path = Vec::new();
        let mut current = states;
        loop {
            let node = current.first().expect("machine must declare at least one top-level state");
            path.push(node.id.clone());
            if node.children.is_empty() {
                break;
            }
            current = &node.children;
        }
        path
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn stack_path(&self) -> &[StateId] {
        &self.stack_path
    }

    /// True if the current leaf's id equals `id`.
    pub fn is_at(&self, id: &str) -> bool {
        self.stack_path.last().map(|s| s.0 == id).unwrap_or(false)
    }

    /// True while an invoked actor is running for the current leaf.
    pub fn has_pending_invoke(&self) -> bool {
        self.pending.is_some()
    }

    fn resolve(&self, event: &str) -> Option<StatePath> {
        for depth in (0..self.stack_path.len()).rev() {
            if let Some(node) = find_path(&self.states, &self.stack_path[..=depth]) {
                if let Some(target) = node.on.get(event) {
                    return Some(target.clone());
                }
            }
        }
        self.root_on.get(event).cloned()
    }

    /// Cancel any in-flight invoke cooperatively (§4.3 "Invoke
    /// cancellation", §8 invariant 4): the task is aborted and dropped
    /// without ever producing a synthetic `on_done`/`on_error`.
    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }

    /// Apply an external event (§4.3 steps 1-7). Cancels any pending
    /// invoke first, then resolves and applies the transition. Returns
    /// `false` with no state change if no state matched the event (step 8).
    #[instrument(skip(self), fields(event, from = %self.stack_path.last().map(|s| s.0.as_str()).unwrap_or("<none>")))]
    pub fn send(&mut self, event: &str) -> bool {
        self.cancel_pending();
        match self.resolve(event) {
            Some(target) => {
                debug!(target = ?target.iter().map(|s| s.0.as_str()).collect::<Vec<_>>(), "transition matched");
                self.apply_transition(&target, &[], &serde_json::Value::Null);
                true
            }
            None => {
                debug!("no matching transition; event ignored");
                false
            }
        }
    }

    /// Run exit/completion-actions/entry for a transition to `target`, then
    /// start the new leaf's invoke if it declares one (§4.3 steps 3-7).
    fn apply_transition(&mut self, target: &StatePath, actions: &[ActionFn<C>], payload: &serde_json::Value) {
        let common = self.stack_path.iter().zip(target.iter()).take_while(|(a, b)| a == b).count();

        for depth in (common..self.stack_path.len()).rev() {
            let exits = find_path(&self.states, &self.stack_path[..=depth])
                .map(|n| n.exit.clone())
                .unwrap_or_default();
            for exit_fn in exits {
                exit_fn(&mut self.context);
            }
        }

        for action in actions {
            action(&mut self.context, payload);
        }

        self.stack_path = target.clone();

        for depth in common..target.len() {
            let entries = find_path(&self.states, &target[..=depth]).map(|n| n.entry.clone()).unwrap_or_default();
            for entry_fn in entries {
                entry_fn(&mut self.context);
            }
        }

        if let Some(node) = find_path(&self.states, target) {
            if let Some(invoke) = &node.invoke {
                let input = (invoke.input_fn)(&self.context);
                let run = invoke.run.clone();
                let handle = tokio::spawn(async move { run(input).await });
                self.pending = Some(PendingInvoke { state_path: target.clone(), handle });
                info!(state = %target.last().unwrap(), "invoke started");
            }
        }
    }

    /// Drive the machine forward through any pending invoke completions
    /// until it reaches a leaf with no invoke — the "next natural pause"
    /// (§4.6 step 4). A no-op if nothing is pending.
    #[instrument(skip(self))]
    pub async fn settle(&mut self) -> Result<()> {
        while let Some(pending) = self.pending.take() {
            let PendingInvoke { state_path, handle } = pending;
            let node = find_path(&self.states, &state_path)
                .expect("invoked state must still exist in the tree");
            let invoke = node.invoke.as_ref().expect("pending invoke state must declare invoke");
            let on_done = invoke.on_done.clone();
            let on_error = invoke.on_error.clone();

            let result = handle.await.map_err(|e| FsmError::InvokeJoin(e.to_string()))?;
            match result {
                Ok(payload) => {
                    info!(state = %state_path.last().unwrap(), "invoke completed: on_done");
                    self.apply_transition(&on_done.target, &on_done.actions, &payload);
                }
                Err(payload) => {
                    info!(state = %state_path.last().unwrap(), "invoke completed: on_error");
                    self.apply_transition(&on_error.target, &on_error.actions, &payload);
                }
            }
        }
        Ok(())
    }
}

impl<C: Serialize> Machine<C> {
    /// Serialize the running machine (§6.3). Entry actions are never
    /// replayed on a subsequent `load` (§3 "Checkpoint" invariant).
    pub fn dump(&self) -> Checkpoint {
        Checkpoint {
            stack_path: self.stack_path.iter().map(|s| s.0.clone()).collect(),
            context: serde_json::to_value(&self.context).expect("context must serialize to JSON"),
            actors: Default::default(),
        }
    }
}

impl<C: DeserializeOwned> Machine<C> {
    /// Reconstruct a machine from a checkpoint against a freshly built
    /// state tree (the tree itself, being closures, is never serialized —
    /// only `stack_path` and `context` are).
    pub fn load(states: Vec<StateNode<C>>, root_on: HashMap<String, StatePath>, checkpoint: Checkpoint) -> Result<Self> {
        let context: C = serde_json::from_value(checkpoint.context)?;
        let stack_path = checkpoint.stack_path.into_iter().map(StateId).collect();
        Ok(Self { states, root_on, context, stack_path, pending: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{path, Completion, Invoke, StateNode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Ctx {
        draft_entries: usize,
        merged: Option<String>,
    }

    fn immediate_ok(value: serde_json::Value) -> crate::state::InvokeRun {
        Arc::new(move |_input| {
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        })
    }

    fn never_completes() -> crate::state::InvokeRun {
        Arc::new(|_input| Box::pin(async move { std::future::pending().await }))
    }

    fn two_state_machine(run: crate::state::InvokeRun) -> Machine<Ctx> {
        let draft = StateNode::new("DRAFT")
            .entry(|ctx: &mut Ctx| ctx.draft_entries += 1)
            .invoke(Invoke {
                input_fn: Arc::new(|_ctx| serde_json::Value::Null),
                run,
                on_done: Completion::to(path(&["REVIEW"]))
                    .with_action(|ctx: &mut Ctx, payload| ctx.merged = payload.as_str().map(String::from)),
                on_error: Completion::to(path(&["FAILURE"])),
            })
            .build();
        let review = StateNode::new("REVIEW").on("CONFIRM", path(&["DONE"])).build();
        let done = StateNode::new("DONE").build();
        let failure = StateNode::new("FAILURE").build();

        Machine::new(vec![draft, review, done, failure], HashMap::new(), Ctx::default())
    }

    #[tokio::test]
    async fn initial_state_is_first_leaf_with_no_entry_fired() {
        let m = two_state_machine(never_completes());
        assert_eq!(m.stack_path(), &[StateId::from("DRAFT")]);
        assert_eq!(m.context().draft_entries, 0);
    }

    #[tokio::test]
    async fn invoke_completion_merges_into_context_and_advances() {
        let mut m = two_state_machine(immediate_ok(serde_json::json!("hello")));
        // Entering DRAFT happens at construction time in this test helper
        // (the invoke was already started by `apply_transition` inside
        // `Machine::new`'s caller in real usage); here we drive it directly
        // via a transition into DRAFT to exercise the full lifecycle.
        m.send("reenter"); // no-op: no matching event at construction
        // Force-start DRAFT's invoke the way a real PROMPT->DRAFT transition would.
        let target = path(&["DRAFT"]);
        m.apply_transition(&target, &[], &serde_json::Value::Null);
        m.settle().await.unwrap();

        assert_eq!(m.stack_path(), &[StateId::from("REVIEW")]);
        assert_eq!(m.context().merged.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn dead_event_is_a_no_op() {
        let mut m = two_state_machine(never_completes());
        let before = (m.stack_path().to_vec(), m.context().clone());
        let matched = m.send("NO_SUCH_EVENT");
        assert!(!matched);
        assert_eq!(before, (m.stack_path().to_vec(), m.context().clone()));
    }

    #[tokio::test]
    async fn exiting_a_state_cancels_its_pending_invoke() {
        let completed = Arc::new(AtomicUsize::new(0));
        let completed_clone = completed.clone();
        let run: crate::state::InvokeRun = Arc::new(move |_input| {
            let completed = completed_clone.clone();
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::Value::Null)
            })
        });
        let mut m = two_state_machine(run);
        m.apply_transition(&path(&["DRAFT"]), &[], &serde_json::Value::Null);
        assert!(m.has_pending_invoke());

        // A feedback-style event fires while DRAFT's invoke is still
        // pending; cancel_pending() must abort it before the transition.
        m.apply_transition(&path(&["FAILURE"]), &[], &serde_json::Value::Null);
        m.send("anything_with_no_match");
        assert!(!m.has_pending_invoke());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn checkpoint_round_trips() {
        let mut m = two_state_machine(immediate_ok(serde_json::json!("x")));
        m.apply_transition(&path(&["DRAFT"]), &[], &serde_json::Value::Null);
        m.settle().await.unwrap();

        let dump1 = m.dump();
        let states_for_load = {
            let draft = StateNode::new("DRAFT").build();
            let review = StateNode::new("REVIEW").on("CONFIRM", path(&["DONE"])).build();
            let done = StateNode::new("DONE").build();
            let failure = StateNode::new("FAILURE").build();
            vec![draft, review, done, failure]
        };
        let loaded: Machine<Ctx> = Machine::load(states_for_load, HashMap::new(), dump1.clone()).unwrap();
        let dump2 = loaded.dump();
        assert_eq!(serde_json::to_string(&dump1).unwrap(), serde_json::to_string(&dump2).unwrap());
        assert_eq!(loaded.stack_path(), &[StateId::from("REVIEW")]);
    }
}
