//! Per-request driver (§4.6): restores a checkpoint if the client handed
//! one back, runs [`tool_processor::FSMToolProcessor`] to completion or a
//! pause, diffs the result, and emits SSE events — the (H) component sitting
//! between the HTTP server and the FSM tool-call loop.

pub mod diff;
pub mod error;
pub mod naming;
pub mod session;
pub mod wire;

pub use error::{Result, SessionError};
pub use session::{AgentSession, SessionDeps};
pub use wire::{
    AgentMessage, AgentRequest, AgentSseEvent, AgentSseMessage, AgentState, AgentStatus, FileEntry, MessageKind,
};

#[cfg(test)]
mod tests {
    use super::*;
    use fsm_checkpoint::InMemorySnapshotStore;
    use llm::{AsyncLLM, Completion, CompletionRequest, ContentBlock, StopReason, Usage};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use workspace::MemoryWorkspace;

    /// Drives the outer loop start_fsm -> confirm_state x4 -> COMPLETE,
    /// same script as `tool-processor`'s integration test.
    struct ScriptedOuterLlm {
        turn: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AsyncLLM for ScriptedOuterLlm {
        async fn completion(&self, _request: CompletionRequest) -> llm::Result<Completion> {
            let turn = self.turn.fetch_add(1, Ordering::SeqCst);
            let content = match turn {
                0 => vec![ContentBlock::ToolUse {
                    id: "call_0".to_string(),
                    name: "start_fsm".to_string(),
                    input: json!({ "app_description": "a todo app" }),
                }],
                1..=4 => vec![ContentBlock::ToolUse {
                    id: format!("call_{}", turn),
                    name: "confirm_state".to_string(),
                    input: json!({}),
                }],
                _ => vec![ContentBlock::TextRaw { text: "nothing left to do".to_string() }],
            };
            Ok(Completion { content, stop_reason: StopReason::ToolUse, usage: Usage::default() })
        }
    }

    struct OneShotActorLlm;

    #[async_trait::async_trait]
    impl AsyncLLM for OneShotActorLlm {
        async fn completion(&self, request: CompletionRequest) -> llm::Result<Completion> {
            let already_used_tool = request
                .messages
                .iter()
                .any(|m| m.content.iter().any(|b| matches!(b, ContentBlock::ToolUse { .. })));

            let (content, stop_reason) = if !request.tools.is_empty() && !already_used_tool {
                (
                    vec![ContentBlock::ToolUse {
                        id: "write_0".to_string(),
                        name: "write_file".to_string(),
                        input: json!({ "path": "client/src/App.tsx", "content": "export default function App() {}" }),
                    }],
                    StopReason::ToolUse,
                )
            } else {
                let text = "=== FILE: server/src/index.ts ===\nexport const ok = true;\n=== END FILE ===\n".to_string();
                (vec![ContentBlock::TextRaw { text }], StopReason::EndTurn)
            };
            Ok(Completion { content, stop_reason, usage: Usage::default() })
        }
    }

    struct NamingLlm;

    #[async_trait::async_trait]
    impl AsyncLLM for NamingLlm {
        async fn completion(&self, _request: CompletionRequest) -> llm::Result<Completion> {
            Ok(Completion {
                content: vec![ContentBlock::TextRaw { text: "todo-app".to_string() }],
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    fn deps() -> SessionDeps {
        SessionDeps {
            llm_for_actors: Arc::new(OneShotActorLlm),
            naming_llm: Arc::new(NamingLlm),
            workspace: Arc::new(MemoryWorkspace::empty()),
            snapshots: Arc::new(InMemorySnapshotStore::new()),
        }
    }

    #[tokio::test]
    async fn happy_path_emits_stage_results_then_one_review_result() {
        let request = AgentRequest {
            all_messages: vec![AgentMessage { role: "user".to_string(), content: "Build a todo app".to_string() }],
            application_id: "a1".to_string(),
            trace_id: "t1".to_string(),
            all_files: None,
            agent_state: None,
            settings: None,
        };

        let (tx, mut rx) = mpsc::channel(8);
        let session = AgentSession::new("a1", "t1");
        session.process(request, deps(), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(!events.is_empty());
        for event in &events {
            assert_eq!(event.trace_id, "t1");
        }

        let review_results: Vec<_> =
            events.iter().filter(|e| matches!(e.message.kind, MessageKind::ReviewResult)).collect();
        assert_eq!(review_results.len(), 2, "one initial template review, one final completion review");

        let last = events.last().unwrap();
        assert_eq!(last.status, AgentStatus::Idle);
        assert!(matches!(last.message.kind, MessageKind::ReviewResult));
        assert!(last.message.unified_diff.as_deref().unwrap_or_default().len() > 0);
        assert_ne!(last.message.commit_message.as_deref(), Some("Initial commit"));
    }

    #[tokio::test]
    async fn resumed_session_does_not_resend_initial_template_review() {
        let first_request = AgentRequest {
            all_messages: vec![AgentMessage { role: "user".to_string(), content: "Build a todo app".to_string() }],
            application_id: "a1".to_string(),
            trace_id: "t1".to_string(),
            all_files: None,
            agent_state: None,
            settings: None,
        };
        let shared_deps = deps();

        let (tx, mut rx) = mpsc::channel(8);
        let session = AgentSession::new("a1", "t1");
        session.process(first_request, shared_deps.clone(), tx).await;

        let mut checkpoint = None;
        while let Some(event) = rx.recv().await {
            if let Some(state) = event.message.agent_state {
                checkpoint = Some(state.fsm_state);
            }
        }
        let checkpoint = checkpoint.expect("a checkpoint was persisted");

        let resumed_request = AgentRequest {
            all_messages: vec![
                AgentMessage { role: "user".to_string(), content: "Build a todo app".to_string() },
                AgentMessage { role: "user".to_string(), content: "Add authentication".to_string() },
            ],
            application_id: "a1".to_string(),
            trace_id: "t1".to_string(),
            all_files: None,
            agent_state: Some(AgentState { fsm_state: checkpoint }),
            settings: None,
        };

        let (tx2, mut rx2) = mpsc::channel(8);
        session.process(resumed_request, shared_deps, tx2).await;

        let mut resumed_events = Vec::new();
        while let Some(event) = rx2.recv().await {
            resumed_events.push(event);
        }
        for event in &resumed_events {
            assert_eq!(event.trace_id, "t1");
        }
        assert!(!resumed_events
            .iter()
            .any(|e| matches!(e.message.kind, MessageKind::ReviewResult) && e.message.commit_message.as_deref() == Some("Initial commit")));
    }
}
