//! `ApplicationEvent`: the sum-typed external event alphabet for the
//! Application FSM (§4.3 "Events are sum-typed, not string-tagged").
//!
//! `fsm-core` itself keeps event identity as an opaque string tag so the
//! engine stays reusable outside this one machine; this enum is the typed
//! surface callers (the `tool-processor`/`agent-session` crates) actually
//! use, translated to the matching string tag and any context mutation the
//! event requires before calling [`fsm_core::Machine::send`].
//!
//! `Done`/`Error` are deliberately absent here: those are synthesized
//! internally by `fsm-core`'s invoke lifecycle (`Machine::settle`) from an
//! actor's own success/failure, never sent by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationEvent {
    Prompt { user_prompt: String },
    Confirm,
    FeedbackDraft { feedback: String },
    FeedbackHandlers { feedback: String },
    FeedbackIndex { feedback: String },
    FeedbackFrontend { feedback: String },
    /// Feedback on an already-`COMPLETE` application (§4.4 last paragraph):
    /// routed through the `Edit` actor rather than restarting a stage from
    /// scratch.
    FeedbackEdit { feedback: String },
    /// Forces a transition to `FAILURE` from any state (the root-level
    /// `any -> on_error -> FAILURE` fallback in §4.4's diagram), for
    /// failures detected outside the normal invoke lifecycle.
    Abort { message: String },
}

impl ApplicationEvent {
    /// The string tag this event resolves to in the underlying machine.
    pub fn tag(&self) -> &'static str {
        match self {
            ApplicationEvent::Prompt { .. } => "PROMPT",
            ApplicationEvent::Confirm => "CONFIRM",
            ApplicationEvent::FeedbackDraft { .. } => "FEEDBACK_DRAFT",
            ApplicationEvent::FeedbackHandlers { .. } => "FEEDBACK_HANDLERS",
            ApplicationEvent::FeedbackIndex { .. } => "FEEDBACK_INDEX",
            ApplicationEvent::FeedbackFrontend { .. } => "FEEDBACK_FRONTEND",
            ApplicationEvent::FeedbackEdit { .. } => "FEEDBACK_EDIT",
            ApplicationEvent::Abort { .. } => "ERROR",
        }
    }
}

/// Apply `event` to `machine`: stages any context mutation the event
/// carries (the user prompt, accumulated feedback) before resolving the
/// transition, since `fsm-core`'s generic `send` only carries an event tag.
pub fn apply(machine: &mut fsm_core::Machine<crate::ApplicationContext>, event: ApplicationEvent) -> bool {
    let tag = event.tag();
    match event {
        ApplicationEvent::Prompt { user_prompt } => {
            machine.context_mut().user_prompt = user_prompt;
        }
        ApplicationEvent::Confirm => {}
        ApplicationEvent::FeedbackDraft { feedback } => {
            machine.context_mut().feedback.draft = Some(feedback);
        }
        ApplicationEvent::FeedbackHandlers { feedback } => {
            machine.context_mut().feedback.handlers = Some(feedback);
        }
        ApplicationEvent::FeedbackIndex { feedback } => {
            machine.context_mut().feedback.index = Some(feedback);
        }
        ApplicationEvent::FeedbackFrontend { feedback } => {
            machine.context_mut().feedback.frontend = Some(feedback);
        }
        ApplicationEvent::FeedbackEdit { feedback } => {
            machine.context_mut().feedback.edit = Some(feedback);
        }
        ApplicationEvent::Abort { message } => {
            machine.context_mut().error = Some(message);
        }
    }
    machine.send(tag)
}

/// Which `FEEDBACK_*` event a `provide_feedback` tool call should raise
/// given the machine's current leaf — `tool-processor` has no business
/// knowing the state graph's shape itself.
pub fn feedback_event_for(current_leaf: &str, feedback: String) -> Option<ApplicationEvent> {
    match current_leaf {
        "REVIEW_DRAFT" => Some(ApplicationEvent::FeedbackDraft { feedback }),
        "REVIEW_HANDLERS" => Some(ApplicationEvent::FeedbackHandlers { feedback }),
        "REVIEW_INDEX" => Some(ApplicationEvent::FeedbackIndex { feedback }),
        "REVIEW_FRONTEND" => Some(ApplicationEvent::FeedbackFrontend { feedback }),
        "COMPLETE" | "REVIEW_EDIT" => Some(ApplicationEvent::FeedbackEdit { feedback }),
        _ => None,
    }
}
