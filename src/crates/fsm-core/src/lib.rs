//! A generic, hierarchical, checkpointable state machine with invoke-style
//! actor integration (§4.3).
//!
//! `fsm-core` knows nothing about code generation: states, events, and the
//! actors bound to them via `invoke` are all opaque from here. `fsm-app`
//! instantiates this engine with the concrete Application FSM (§4.4); this
//! crate only provides the transition algorithm, the entry/exit/invoke
//! lifecycle, and checkpoint dump/load.

pub mod checkpoint;
pub mod error;
pub mod machine;
pub mod state;

pub use checkpoint::Checkpoint;
pub use error::{FsmError, Result};
pub use machine::Machine;
pub use state::{path, ActionFn, Completion, EntryFn, Invoke, InvokeInput, InvokeRun, StateId, StateNode, StatePath};
