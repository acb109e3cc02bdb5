//! `ApplicationContext`: the code-gen FSM's context dataclass (§3
//! "ApplicationContext").

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use workspace::FileMap;

/// Per-stage feedback strings accumulated on `FEEDBACK_*` events, folded
/// into the matching actor's next `input_fn` read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub draft: Option<String>,
    pub handlers: Option<String>,
    pub index: Option<String>,
    pub frontend: Option<String>,
    pub edit: Option<String>,
}

/// The code-gen FSM's context. Mutated only by entry/exit/on_done/on_error
/// actions; read by `input_fn`.
///
/// `no_changes_applied` lives here exclusively (§3 "ApplicationContext",
/// canonical location decision) — actors mirror their own
/// `no_changes_applied` output into this field via `on_done`, and
/// `FSMToolProcessor`/`AgentSession` read only this field, never an actor
/// result directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationContext {
    pub user_prompt: String,
    pub draft: Option<String>,
    pub feedback: Feedback,
    pub server_files: FileMap,
    pub frontend_files: FileMap,
    pub error: Option<String>,
    pub no_changes_applied: bool,
}

impl ApplicationContext {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self { user_prompt: user_prompt.into(), ..Default::default() }
    }

    /// Every file currently known to the application, server first then
    /// frontend, last-writer-wins on path collision (there should be none).
    pub fn all_files(&self) -> FileMap {
        let mut merged: BTreeMap<String, String> = self.server_files.clone();
        merged.extend(self.frontend_files.clone());
        merged
    }
}
