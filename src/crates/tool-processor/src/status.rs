//! `FsmStatus`: the per-step verdict `AgentSession` branches its SSE
//! emission on (§4.5 step 4, §4.6 step 4b).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmStatus {
    /// The FSM is mid-run; more steps are expected.
    Wip,
    /// The FSM reached its terminal completion state with file changes.
    Completed,
    /// The FSM reached `FAILURE`.
    Failed,
    /// Either a terminal completion with zero file writes, or the outer
    /// LLM emitted no tool calls — both mean "nothing more to do without
    /// new user input".
    RefinementRequest,
}
