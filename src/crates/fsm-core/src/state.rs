//! State tree types: [`StateId`], [`StateNode`], and the `invoke` descriptor
//! that binds an actor to a state (§3 "State", §4.3).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An opaque, ordered identifier for one level of the state tree.
///
/// `fsm-core` never interprets the string; the concrete application FSM
/// (`fsm-app`) is the one that gives these meaning (`"DRAFT"`,
/// `"REVIEW_DRAFT"`, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct StateId(pub String);

impl StateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A path from the machine's implicit root down to some state, inclusive.
pub type StatePath = Vec<StateId>;

/// Build a [`StatePath`] from string literals, e.g. `path(&["DRAFT"])`.
pub fn path(ids: &[&str]) -> StatePath {
    ids.iter().map(|s| StateId::from(*s)).collect()
}

/// Runs against the context on entering/exiting a state. Synchronous: every
/// async side effect in this engine's actual usage happens inside an
/// `invoke`, so entry/exit never need to await anything themselves (a
/// deliberate simplification over the general "async side effects" allowance
/// in §3 — see `DESIGN.md`).
pub type EntryFn<C> = Arc<dyn Fn(&mut C) + Send + Sync>;

/// Runs when an `invoke` completes, folding its result/error payload into
/// the context.
pub type ActionFn<C> = Arc<dyn Fn(&mut C, &Value) + Send + Sync>;

/// Computes an invoke's input value from the current context.
pub type InvokeInput<C> = Arc<dyn Fn(&C) -> Value + Send + Sync>;

/// The actor call itself, erased to JSON in/out so `fsm-core` stays
/// independent of any particular actor's Rust types. `Ok` is a completion,
/// `Err` a failure — both carry a JSON payload that the matching
/// [`Completion`]'s actions receive.
pub type InvokeRun =
    Arc<dyn Fn(Value) -> futures::future::BoxFuture<'static, std::result::Result<Value, Value>> + Send + Sync>;

/// The target and context-merge actions of an invoke's `on_done`/`on_error`
/// handler (§3 "State", `invoke` descriptor).
#[derive(Clone)]
pub struct Completion<C> {
    pub target: StatePath,
    pub actions: Vec<ActionFn<C>>,
}

impl<C> Completion<C> {
    pub fn to(target: StatePath) -> Self {
        Self { target, actions: Vec::new() }
    }

    pub fn with_action(mut self, action: impl Fn(&mut C, &Value) + Send + Sync + 'static) -> Self {
        self.actions.push(Arc::new(action));
        self
    }
}

/// Declares that entering this state launches a concurrent actor whose
/// completion posts a synthetic `on_done`/`on_error` transition.
#[derive(Clone)]
pub struct Invoke<C> {
    pub input_fn: InvokeInput<C>,
    pub run: InvokeRun,
    pub on_done: Completion<C>,
    pub on_error: Completion<C>,
}

/// One vertex of the state tree.
pub struct StateNode<C> {
    pub id: StateId,
    pub entry: Vec<EntryFn<C>>,
    pub exit: Vec<EntryFn<C>>,
    pub invoke: Option<Invoke<C>>,
    pub on: HashMap<String, StatePath>,
    pub children: Vec<StateNode<C>>,
}

impl<C> StateNode<C> {
    pub fn new(id: impl Into<String>) -> StateNodeBuilder<C> {
        StateNodeBuilder {
            node: StateNode {
                id: StateId::new(id),
                entry: Vec::new(),
                exit: Vec::new(),
                invoke: None,
                on: HashMap::new(),
                children: Vec::new(),
            },
        }
    }
}

/// Fluent builder for a [`StateNode`].
pub struct StateNodeBuilder<C> {
    node: StateNode<C>,
}

impl<C> StateNodeBuilder<C> {
    pub fn on(mut self, event: impl Into<String>, target: StatePath) -> Self {
        self.node.on.insert(event.into(), target);
        self
    }

    pub fn entry(mut self, f: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        self.node.entry.push(Arc::new(f));
        self
    }

    pub fn exit(mut self, f: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        self.node.exit.push(Arc::new(f));
        self
    }

    pub fn invoke(mut self, invoke: Invoke<C>) -> Self {
        self.node.invoke = Some(invoke);
        self
    }

    pub fn child(mut self, child: StateNode<C>) -> Self {
        self.node.children.push(child);
        self
    }

    pub fn build(self) -> StateNode<C> {
        self.node
    }
}

/// Find the node addressed by `path`, descending from `states` (the
/// machine's top-level states). A free function (rather than a `Machine`
/// method) so callers can hold this borrow disjoint from a mutable borrow
/// of the context field alongside it.
pub fn find_path<'a, C>(states: &'a [StateNode<C>], path: &[StateId]) -> Option<&'a StateNode<C>> {
    let mut nodes = states;
    let mut found = None;
    for id in path {
        found = nodes.iter().find(|n| &n.id == id);
        match found {
            Some(n) => nodes = &n.children,
            None => return None,
        }
    }
    found
}
