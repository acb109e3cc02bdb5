//! `AgentSession`: the per-request driver (§4.6) — restore a checkpoint if
//! one was handed back, run the FSM tool-call loop to completion or a
//! pause, diff the result, and emit SSE events for each step.

use std::sync::Arc;

use fsm_checkpoint::SnapshotStore;
use llm::{AsyncLLM, Message as LlmMessage, Role as LlmRole};
use tokio::sync::mpsc::Sender;
use tool_processor::{FSMToolProcessor, FsmStatus, StepParams};
use tracing::{info, instrument, warn};
use workspace::{FileMap, Workspace};

use crate::diff::{baseline_from_request, unified_diff};
use crate::error::Result;
use crate::naming::{generate_app_name, generate_commit_message};
use crate::wire::{AgentMessage, AgentRequest, AgentSseEvent, AgentSseMessage, AgentStatus, MessageKind};

/// Collaborators an `AgentSession` needs beyond the request itself — kept
/// as one bundle so `process`'s signature doesn't grow a parameter per
/// dependency as the session gains more ambient concerns.
#[derive(Clone)]
pub struct SessionDeps {
    /// Drives the FSM's actor invocations (Draft/Handlers/Index/Frontend/Edit).
    pub llm_for_actors: Arc<dyn AsyncLLM>,
    /// A cheaper/faster model for the app-name and commit-message blurbs.
    pub naming_llm: Arc<dyn AsyncLLM>,
    /// The session's long-lived workspace (§3 "session workspace" pattern).
    pub workspace: Arc<dyn Workspace>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

pub struct AgentSession {
    pub application_id: String,
    pub trace_id: String,
}

impl AgentSession {
    pub fn new(application_id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self { application_id: application_id.into(), trace_id: trace_id.into() }
    }

    /// Runs the full per-request lifecycle, sending every emitted event on
    /// `events`. Never returns an `Err` to the caller: failures become a
    /// single `RuntimeError` event (§7 "Unhandled exception in session
    /// loop"), matching the rest of the taxonomy's "session-scoped
    /// recovery" policy. `Err` is reserved for the narrow case where even
    /// sending that error event fails (a generic channel logging call
    /// upstream is the right place to observe it).
    #[instrument(skip_all, fields(application_id = %self.application_id, trace_id = %self.trace_id))]
    pub async fn process(&self, request: AgentRequest, deps: SessionDeps, events: Sender<AgentSseEvent>) {
        let is_resume = request.agent_state.is_some();

        let mut processor = match self.restore_processor(&request, &deps) {
            Ok(processor) => processor,
            Err(e) => {
                self.send_runtime_error(&events, e).await;
                return;
            }
        };

        if let Err(e) = self.snapshot(&processor, &deps, "fsm_enter").await {
            warn!(error = %e, "failed to persist fsm_enter snapshot");
        }

        let outcome = self.run_loop(&mut processor, &request, &deps, &events, is_resume).await;

        if let Err(e) = self.snapshot(&processor, &deps, "fsm_exit").await {
            warn!(error = %e, "failed to persist fsm_exit snapshot");
        }

        if let Err(e) = outcome {
            self.send_runtime_error(&events, e).await;
        }

        info!("session processing finished");
    }

    fn restore_processor(&self, request: &AgentRequest, deps: &SessionDeps) -> Result<FSMToolProcessor> {
        match &request.agent_state {
            Some(state) => {
                info!("continuing with existing checkpoint");
                Ok(FSMToolProcessor::restore(
                    deps.llm_for_actors.clone(),
                    deps.workspace.clone(),
                    state.fsm_state.clone(),
                )?)
            }
            None => {
                info!("starting new session");
                Ok(FSMToolProcessor::new(deps.llm_for_actors.clone(), deps.workspace.clone()))
            }
        }
    }

    async fn snapshot(&self, processor: &FSMToolProcessor, deps: &SessionDeps, key: &str) -> Result<()> {
        let Some(checkpoint) = processor.checkpoint() else {
            return Ok(());
        };
        let value = serde_json::to_value(checkpoint).map_err(fsm_checkpoint::CheckpointError::Serialization)?;
        deps.snapshots.put(&self.trace_id, key, value).await?;
        Ok(())
    }

    async fn run_loop(
        &self,
        processor: &mut FSMToolProcessor,
        request: &AgentRequest,
        deps: &SessionDeps,
        events: &Sender<AgentSseEvent>,
        is_resume: bool,
    ) -> Result<()> {
        let mut messages = convert_messages(&request.all_messages);
        let mut app_name: Option<String> = None;
        let mut sent_initial_review = false;

        loop {
            let (next_messages, status) =
                processor.step(messages, deps.llm_for_actors.clone(), StepParams::default()).await?;
            messages = next_messages;

            if !is_resume && !sent_initial_review && processor.current_state() == Some("REVIEW_DRAFT") {
                sent_initial_review = true;
                if let Some(ctx) = processor.context() {
                    app_name = Some(generate_app_name(&ctx.user_prompt, deps.naming_llm.as_ref()).await);
                    let diff = unified_diff(&FileMap::new(), &ctx.all_files());
                    let event = self.event(
                        AgentStatus::Running,
                        AgentSseMessage::new(MessageKind::ReviewResult, last_assistant_text(&messages))
                            .with_agent_state_opt(processor.checkpoint())
                            .with_diff(diff)
                            .with_app_name(app_name.clone())
                            .with_commit_message("Initial commit"),
                    );
                    if events.send(event).await.is_err() {
                        return Ok(());
                    }
                }
            }

            match status {
                FsmStatus::Wip => {
                    let event = self.event(
                        AgentStatus::Running,
                        AgentSseMessage::new(MessageKind::StageResult, serialize_history(&messages))
                            .with_agent_state_opt(processor.checkpoint())
                            .with_app_name(app_name.clone()),
                    );
                    if events.send(event).await.is_err() {
                        return Ok(());
                    }
                }
                FsmStatus::RefinementRequest => {
                    let event = self.event(
                        AgentStatus::Idle,
                        AgentSseMessage::new(MessageKind::RefinementRequest, last_assistant_text(&messages))
                            .with_agent_state_opt(processor.checkpoint())
                            .with_app_name(app_name.clone()),
                    );
                    let _ = events.send(event).await;
                    return Ok(());
                }
                FsmStatus::Failed => {
                    let reason = processor.context().and_then(|ctx| ctx.error.clone()).unwrap_or_default();
                    let event = self.event(
                        AgentStatus::Idle,
                        AgentSseMessage::new(MessageKind::RuntimeError, reason)
                            .with_agent_state_opt(processor.checkpoint())
                            .with_app_name(app_name.clone()),
                    );
                    let _ = events.send(event).await;
                    return Ok(());
                }
                FsmStatus::Completed => {
                    if let Some(ctx) = processor.context() {
                        let baseline = baseline_from_request(request.all_files.as_deref());
                        let diff = unified_diff(&baseline, &ctx.all_files());
                        let commit_message = generate_commit_message(&ctx.user_prompt, deps.naming_llm.as_ref()).await;
                        let event = self.event(
                            AgentStatus::Idle,
                            AgentSseMessage::new(MessageKind::ReviewResult, last_assistant_text(&messages))
                                .with_agent_state_opt(processor.checkpoint())
                                .with_diff(diff)
                                .with_app_name(app_name.clone())
                                .with_commit_message(commit_message),
                        );
                        let _ = events.send(event).await;
                    }
                    return Ok(());
                }
            }
        }
    }

    fn event(&self, status: AgentStatus, message: AgentSseMessage) -> AgentSseEvent {
        AgentSseEvent { status, trace_id: self.trace_id.clone(), message }
    }

    async fn send_runtime_error(&self, events: &Sender<AgentSseEvent>, error: crate::error::SessionError) {
        warn!(error = %error, "session loop failed");
        let event = self.event(
            AgentStatus::Idle,
            AgentSseMessage::new(MessageKind::RuntimeError, format!("Error processing request: {}", error)),
        );
        let _ = events.send(event).await;
    }
}

fn convert_messages(agent_messages: &[AgentMessage]) -> Vec<LlmMessage> {
    agent_messages
        .iter()
        .map(|m| {
            let role = if m.role == "user" { LlmRole::User } else { LlmRole::Assistant };
            LlmMessage { role, content: vec![llm::ContentBlock::TextRaw { text: m.content.clone() }] }
        })
        .collect()
}

fn serialize_history(messages: &[LlmMessage]) -> String {
    serde_json::to_string(messages).unwrap_or_default()
}

fn last_assistant_text(messages: &[LlmMessage]) -> String {
    messages
        .iter()
        .rev()
        .find(|m| m.role == LlmRole::Assistant)
        .map(|m| m.content.iter().filter_map(llm::ContentBlock::as_text).collect::<Vec<_>>().join(""))
        .unwrap_or_default()
}
