//! `FSMToolProcessor`: drives the Application FSM through tool calls issued
//! by an outer LLM (§4.5).

use std::sync::Arc;

use fsm_app::{ApplicationContext, ApplicationEvent};
use fsm_core::Machine;
use llm::{AsyncLLM, CompletionRequest, ContentBlock, Message, Role};
use tracing::{info, instrument, warn};
use workspace::Workspace;

use crate::error::Result;
use crate::status::FsmStatus;
use crate::tools::{complete_fsm_tool, confirm_state_tool, provide_feedback_tool, start_fsm_tool};

/// Parameters for one `step` call, independent of the conversation itself.
#[derive(Debug, Clone)]
pub struct StepParams {
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl Default for StepParams {
    fn default() -> Self {
        Self { max_tokens: 4096, temperature: None }
    }
}

/// The result of dispatching a single tool call.
struct ToolOutcome {
    text: String,
    is_error: bool,
}

impl ToolOutcome {
    fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: false }
    }
    fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: true }
    }
}

/// Owns (at most) one running Application FSM and exposes it to an outer
/// LLM as four tools. `llm_for_actors`/`workspace` are the collaborators the
/// FSM's own invoked actors need; they are independent of whichever `llm`
/// parameter `step` receives for the outer tool-calling turn.
pub struct FSMToolProcessor {
    llm_for_actors: Arc<dyn AsyncLLM>,
    workspace: Arc<dyn Workspace>,
    machine: Option<Machine<ApplicationContext>>,
}

impl FSMToolProcessor {
    /// A processor with no FSM bound yet; only `start_fsm` is offered.
    pub fn new(llm_for_actors: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Self {
        Self { llm_for_actors, workspace, machine: None }
    }

    /// A processor restored from a prior checkpoint (§4.6 step 1).
    pub fn restore(
        llm_for_actors: Arc<dyn AsyncLLM>,
        workspace: Arc<dyn Workspace>,
        checkpoint: fsm_core::Checkpoint,
    ) -> Result<Self> {
        let machine = fsm_app::load_application_machine(llm_for_actors.clone(), workspace.clone(), checkpoint)?;
        Ok(Self { llm_for_actors, workspace, machine: Some(machine) })
    }

    pub fn is_bound(&self) -> bool {
        self.machine.is_some()
    }

    pub fn checkpoint(&self) -> Option<fsm_core::Checkpoint> {
        self.machine.as_ref().map(Machine::dump)
    }

    pub fn context(&self) -> Option<&ApplicationContext> {
        self.machine.as_ref().map(Machine::context)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.machine.as_ref().and_then(|m| m.stack_path().last()).map(|id| id.0.as_str())
    }

    fn tool_schemas(&self) -> Vec<llm::ToolDefinition> {
        if self.machine.is_none() {
            vec![start_fsm_tool()]
        } else {
            vec![confirm_state_tool(), provide_feedback_tool(), complete_fsm_tool()]
        }
    }

    /// One turn: call `llm` with the live tool schemas, dispatch every
    /// `tool_use` the response contains, and report the resulting
    /// [`FsmStatus`] (§4.5 steps 1-4).
    #[instrument(skip_all)]
    pub async fn step(
        &mut self,
        mut messages: Vec<Message>,
        llm: Arc<dyn AsyncLLM>,
        params: StepParams,
    ) -> Result<(Vec<Message>, FsmStatus)> {
        let mut request = CompletionRequest::new(messages.clone(), params.max_tokens).with_tools(self.tool_schemas());
        if let Some(temperature) = params.temperature {
            request = request.with_temperature(temperature);
        }

        let completion = llm.completion(request).await?;
        let assistant_message = Message::assistant(completion.content.clone());
        messages.push(assistant_message);

        let tool_uses = completion.tool_uses();
        if tool_uses.is_empty() {
            return Ok((messages, self.decide_status(true)));
        }

        let mut result_blocks = Vec::with_capacity(tool_uses.len());
        for (id, name, input) in tool_uses {
            let outcome = self.dispatch(name, input).await;
            result_blocks.push(ContentBlock::TextRaw {
                text: format!("[tool_result id={} error={}] {}", id, outcome.is_error, outcome.text),
            });
        }
        messages.push(Message { role: Role::User, content: result_blocks });

        Ok((messages, self.decide_status(false)))
    }

    async fn dispatch(&mut self, name: &str, input: &serde_json::Value) -> ToolOutcome {
        match name {
            "start_fsm" => self.dispatch_start_fsm(input).await,
            "confirm_state" => self.dispatch_confirm_state().await,
            "provide_feedback" => self.dispatch_provide_feedback(input).await,
            "complete_fsm" => self.dispatch_complete_fsm(),
            other => ToolOutcome::error(format!("unknown tool '{}'", other)),
        }
    }

    async fn dispatch_start_fsm(&mut self, input: &serde_json::Value) -> ToolOutcome {
        if self.machine.is_some() {
            return ToolOutcome::error("an FSM is already running for this session");
        }
        let Some(app_description) = input.get("app_description").and_then(|v| v.as_str()) else {
            return ToolOutcome::error("start_fsm requires a string `app_description`");
        };

        let mut machine = fsm_app::build_application_machine(self.llm_for_actors.clone(), self.workspace.clone());
        fsm_app::apply(&mut machine, ApplicationEvent::Prompt { user_prompt: app_description.to_string() });
        let settle_result = machine.settle().await;
        self.machine = Some(machine);

        match settle_result {
            Ok(()) => {
                info!(state = ?self.current_state(), "fsm started");
                ToolOutcome::ok(format!("fsm started, now at {}", self.current_state().unwrap_or("?")))
            }
            Err(e) => ToolOutcome::error(format!("fsm failed to settle: {}", e)),
        }
    }

    async fn dispatch_confirm_state(&mut self) -> ToolOutcome {
        let Some(machine) = self.machine.as_mut() else {
            return ToolOutcome::error("no FSM is running; call start_fsm first");
        };
        if !fsm_app::apply(machine, ApplicationEvent::Confirm) {
            return ToolOutcome::error(format!("confirm_state has no effect in state {}", machine.stack_path().last().unwrap()));
        }
        match machine.settle().await {
            Ok(()) => ToolOutcome::ok(format!("confirmed, now at {}", self.current_state().unwrap_or("?"))),
            Err(e) => ToolOutcome::error(format!("fsm failed to settle: {}", e)),
        }
    }

    async fn dispatch_provide_feedback(&mut self, input: &serde_json::Value) -> ToolOutcome {
        let Some(feedback) = input.get("feedback").and_then(|v| v.as_str()) else {
            return ToolOutcome::error("provide_feedback requires a string `feedback`");
        };
        let Some(machine) = self.machine.as_mut() else {
            return ToolOutcome::error("no FSM is running; call start_fsm first");
        };

        let current = machine.stack_path().last().unwrap().0.clone();
        let Some(event) = fsm_app::feedback_event_for(&current, feedback.to_string()) else {
            return ToolOutcome::error(format!("no reviewable stage is pending feedback (currently at {})", current));
        };

        if let Some(component_name) = input.get("component_name").and_then(|v| v.as_str()) {
            warn!(component_name, current = %current, "provide_feedback routed by current state, component_name is advisory only");
        }

        if !fsm_app::apply(machine, event) {
            return ToolOutcome::error(format!("feedback had no effect in state {}", current));
        }
        match machine.settle().await {
            Ok(()) => ToolOutcome::ok(format!("feedback applied, now at {}", self.current_state().unwrap_or("?"))),
            Err(e) => ToolOutcome::error(format!("fsm failed to settle: {}", e)),
        }
    }

    fn dispatch_complete_fsm(&mut self) -> ToolOutcome {
        let Some(machine) = self.machine.as_ref() else {
            return ToolOutcome::error("no FSM is running; call start_fsm first");
        };
        if machine.is_at("COMPLETE") {
            ToolOutcome::ok("application is complete")
        } else {
            ToolOutcome::error(format!("not yet complete (currently at {})", self.current_state().unwrap_or("?")))
        }
    }

    fn decide_status(&self, no_tool_calls: bool) -> FsmStatus {
        let Some(machine) = &self.machine else {
            return FsmStatus::Wip;
        };
        if machine.is_at("FAILURE") {
            return FsmStatus::Failed;
        }
        if machine.is_at("COMPLETE") {
            return if machine.context().no_changes_applied {
                FsmStatus::RefinementRequest
            } else {
                FsmStatus::Completed
            };
        }
        if no_tool_calls {
            return FsmStatus::RefinementRequest;
        }
        FsmStatus::Wip
    }
}
