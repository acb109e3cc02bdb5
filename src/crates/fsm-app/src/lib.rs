//! The concrete code-generation Application FSM (§4.4): instantiates
//! `fsm-core`'s generic engine with [`ApplicationContext`], the
//! [`ApplicationEvent`] alphabet, and the five `actors`-crate stages wired
//! in as `invoke`d states.

pub mod context;
pub mod event;
pub mod machine;

pub use context::{ApplicationContext, Feedback};
pub use event::{apply, feedback_event_for, ApplicationEvent};
pub use machine::{build_application_machine, load_application_machine};

#[cfg(test)]
mod tests {
    use super::*;
    use llm::{AsyncLLM, Completion, CompletionRequest, ContentBlock, StopReason, Usage};
    use std::sync::Arc;
    use workspace::MemoryWorkspace;

    /// Always answers with one file block, never requests a tool — enough
    /// to drive every text-emitting stage to a solution on the first round.
    struct OneShotLlm {
        file_path: String,
    }

    #[async_trait::async_trait]
    impl AsyncLLM for OneShotLlm {
        async fn completion(&self, _request: CompletionRequest) -> llm::Result<Completion> {
            let text = format!("=== FILE: {} ===\nexport const ok = true;\n=== END FILE ===\n", self.file_path);
            Ok(Completion {
                content: vec![ContentBlock::TextRaw { text }],
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    fn test_workspace() -> Arc<dyn workspace::Workspace> {
        Arc::new(MemoryWorkspace::empty())
    }

    #[tokio::test]
    async fn prompt_starts_draft_and_settles_into_review_draft() {
        let llm: Arc<dyn AsyncLLM> = Arc::new(OneShotLlm { file_path: "server/src/index.ts".into() });
        let mut machine = build_application_machine(llm, test_workspace());
        assert_eq!(machine.stack_path(), &[fsm_core::StateId::from("START")]);

        apply(&mut machine, ApplicationEvent::Prompt { user_prompt: "Build a todo app".into() });
        machine.settle().await.unwrap();

        assert_eq!(machine.stack_path(), &[fsm_core::StateId::from("REVIEW_DRAFT")]);
        assert!(!machine.context().server_files.is_empty());
        assert!(!machine.context().no_changes_applied);
    }

    #[tokio::test]
    async fn feedback_in_review_draft_reinvokes_draft_and_returns_to_review() {
        let llm: Arc<dyn AsyncLLM> = Arc::new(OneShotLlm { file_path: "server/src/index.ts".into() });
        let mut machine = build_application_machine(llm, test_workspace());
        apply(&mut machine, ApplicationEvent::Prompt { user_prompt: "Build a todo app".into() });
        machine.settle().await.unwrap();

        apply(&mut machine, ApplicationEvent::FeedbackDraft { feedback: "add a due date field".into() });
        assert_eq!(machine.stack_path(), &[fsm_core::StateId::from("DRAFT")]);
        machine.settle().await.unwrap();

        assert_eq!(machine.stack_path(), &[fsm_core::StateId::from("REVIEW_DRAFT")]);
    }

    #[tokio::test]
    async fn dead_event_in_review_draft_is_a_no_op() {
        let llm: Arc<dyn AsyncLLM> = Arc::new(OneShotLlm { file_path: "server/src/index.ts".into() });
        let mut machine = build_application_machine(llm, test_workspace());
        apply(&mut machine, ApplicationEvent::Prompt { user_prompt: "Build a todo app".into() });
        machine.settle().await.unwrap();

        let dump_before = serde_json::to_string(&machine.dump()).unwrap();
        let matched = apply(&mut machine, ApplicationEvent::FeedbackIndex { feedback: "nope".into() });
        assert!(!matched);
        assert_eq!(dump_before, serde_json::to_string(&machine.dump()).unwrap());
    }

    #[test]
    fn feedback_event_for_maps_review_states_and_complete() {
        assert!(matches!(
            feedback_event_for("REVIEW_HANDLERS", "x".into()),
            Some(ApplicationEvent::FeedbackHandlers { .. })
        ));
        assert!(matches!(feedback_event_for("COMPLETE", "x".into()), Some(ApplicationEvent::FeedbackEdit { .. })));
        assert!(feedback_event_for("DRAFT", "x".into()).is_none());
    }
}
