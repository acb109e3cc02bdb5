//! The outer-LLM-driven tool-call loop over the Application FSM (§4.5):
//! [`FSMToolProcessor`] exposes `start_fsm`/`confirm_state`/
//! `provide_feedback`/`complete_fsm` as tool schemas and decides
//! [`FsmStatus`] after every turn.

pub mod error;
pub mod processor;
pub mod status;
pub mod tools;

pub use error::{ProcessorError, Result};
pub use processor::{FSMToolProcessor, StepParams};
pub use status::FsmStatus;

#[cfg(test)]
mod tests {
    use super::*;
    use llm::{AsyncLLM, Completion, CompletionRequest, ContentBlock, Message, StopReason, Usage};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use workspace::MemoryWorkspace;

    /// Drives the outer conversation: first turn calls `start_fsm`, every
    /// turn after calls `confirm_state` until it runs out of scripted
    /// turns, then emits no tool calls.
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

    /// Every actor invocation resolves in one round. Text-emitting stages
    /// (empty `tools`) get a file block immediately. Tool-driven stages
    /// (Frontend/Edit) get one `write_file` call, then a plain `TextRaw`
    /// reply once the trajectory already shows a tool use, ending
    /// expansion. Eval always passes: unscripted `exec` on
    /// `MemoryWorkspace` defaults to success.
    struct OneShotActorLlm;

    #[async_trait::async_trait]
    impl AsyncLLM for OneShotActorLlm {
        async fn completion(&self, request: CompletionRequest) -> llm::Result<Completion> {
            let already_used_tool = request
                .messages
                .iter()
                .any(|m| m.content.iter().any(|b| matches!(b, ContentBlock::ToolUse { .. })));

            let content = if !request.tools.is_empty() && !already_used_tool {
                vec![ContentBlock::ToolUse {
                    id: "write_0".to_string(),
                    name: "write_file".to_string(),
                    input: json!({ "path": "client/src/App.tsx", "content": "export default function App() {}" }),
                }]
            } else {
                let text = "=== FILE: server/src/index.ts ===\nexport const ok = true;\n=== END FILE ===\n".to_string();
                vec![ContentBlock::TextRaw { text }]
            };

            let stop_reason = if !request.tools.is_empty() && !already_used_tool {
                StopReason::ToolUse
            } else {
                StopReason::EndTurn
            };
            Ok(Completion { content, stop_reason, usage: Usage::default() })
        }
    }

    #[tokio::test]
    async fn start_fsm_then_confirm_through_to_completion() {
        let actor_llm: Arc<dyn AsyncLLM> = Arc::new(OneShotActorLlm);
        let workspace: Arc<dyn workspace::Workspace> = Arc::new(MemoryWorkspace::empty());
        let outer_llm: Arc<dyn AsyncLLM> = Arc::new(ScriptedOuterLlm { turn: AtomicUsize::new(0) });

        let mut processor = FSMToolProcessor::new(actor_llm, workspace);
        let mut messages = vec![Message::user("Build a todo app")];

        let mut status = FsmStatus::Wip;
        for _ in 0..5 {
            let (next_messages, next_status) =
                processor.step(messages, outer_llm.clone(), StepParams::default()).await.unwrap();
            messages = next_messages;
            status = next_status;
            if status != FsmStatus::Wip {
                break;
            }
        }

        assert_eq!(status, FsmStatus::Completed);
        assert_eq!(processor.current_state(), Some("COMPLETE"));
    }

    #[tokio::test]
    async fn confirm_state_before_start_fsm_is_a_reported_error_not_a_panic() {
        let actor_llm: Arc<dyn AsyncLLM> = Arc::new(OneShotActorLlm);
        let workspace: Arc<dyn workspace::Workspace> = Arc::new(MemoryWorkspace::empty());
        let mut processor = FSMToolProcessor::new(actor_llm, workspace);

        struct ConfirmFirstLlm;
        #[async_trait::async_trait]
        impl AsyncLLM for ConfirmFirstLlm {
            async fn completion(&self, _request: CompletionRequest) -> llm::Result<Completion> {
                Ok(Completion {
                    content: vec![ContentBlock::ToolUse {
                        id: "call_0".to_string(),
                        name: "confirm_state".to_string(),
                        input: json!({}),
                    }],
                    stop_reason: StopReason::ToolUse,
                    usage: Usage::default(),
                })
            }
        }

        let messages = vec![Message::user("go")];
        let (messages, status) = processor
            .step(messages, Arc::new(ConfirmFirstLlm), StepParams::default())
            .await
            .unwrap();

        assert_eq!(status, FsmStatus::Wip);
        let last = messages.last().unwrap();
        let text = last.content.iter().filter_map(ContentBlock::as_text).collect::<String>();
        assert!(text.contains("error=true"));
    }

    #[tokio::test]
    async fn no_tool_calls_yields_refinement_request() {
        let actor_llm: Arc<dyn AsyncLLM> = Arc::new(OneShotActorLlm);
        let workspace: Arc<dyn workspace::Workspace> = Arc::new(MemoryWorkspace::empty());
        let mut processor = FSMToolProcessor::new(actor_llm, workspace);

        struct SilentLlm;
        #[async_trait::async_trait]
        impl AsyncLLM for SilentLlm {
            async fn completion(&self, _request: CompletionRequest) -> llm::Result<Completion> {
                Ok(Completion {
                    content: vec![ContentBlock::TextRaw { text: "ok".to_string() }],
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                })
            }
        }

        let messages = vec![Message::user("hi")];
        let (_messages, status) =
            processor.step(messages, Arc::new(SilentLlm), StepParams::default()).await.unwrap();
        assert_eq!(status, FsmStatus::RefinementRequest);
    }
}
