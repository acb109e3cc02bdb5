//! The `ActorProfile` trait: everything that differs between the Draft,
//! Handlers, Index, Frontend, and Edit stages. The shared expand/evaluate
//! loop lives once in [`crate::driver::BeamActor`].

use async_trait::async_trait;
use llm::{ToolChoice, ToolDefinition};
use serde_json::Value;
use workspace::{FileMap, Workspace};

/// The result of dispatching one `tool_use` block against a node's
/// workspace.
pub struct ToolOutcome {
    /// If the tool wrote a file, its path and new content.
    pub written: Option<(String, String)>,
    /// Text fed back to the LLM as the `tool_result` for this call.
    pub result_text: String,
    /// Mirrors the `is_error` flag on an Anthropic tool_result block.
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn ok(result_text: impl Into<String>) -> Self {
        Self { written: None, result_text: result_text.into(), is_error: false }
    }

    pub fn wrote_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        Self {
            result_text: format!("wrote {}", path),
            written: Some((path, content)),
            is_error: false,
        }
    }

    pub fn error(result_text: impl Into<String>) -> Self {
        Self { written: None, result_text: result_text.into(), is_error: true }
    }
}

/// Everything a beam-search stage (Draft, Handlers, Index, Frontend, Edit)
/// needs to supply beyond the shared expand/evaluate mechanics.
#[async_trait]
pub trait ActorProfile: Send + Sync {
    /// The actor's final, stage-specific output (e.g. the filled-in handler
    /// set, or the generated frontend tree).
    type Output: Send + Sync;

    fn beam_width(&self) -> usize;
    fn max_depth(&self) -> usize;

    /// System prompt for this stage, if any.
    fn system_prompt(&self) -> Option<String> {
        None
    }

    /// Tools offered to the LLM during expansion. Empty for stages that
    /// produce output purely as completion text (Draft, Handlers, Index).
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    fn tool_choice(&self) -> Option<ToolChoice> {
        None
    }

    /// Execute one tool call against the node's in-progress workspace.
    async fn apply_tool(&self, workspace: &dyn Workspace, name: &str, input: &Value) -> ToolOutcome {
        let _ = (workspace, input);
        ToolOutcome::error(format!("actor does not support tool '{}'", name))
    }

    /// Parse a completion's final text (after any tool-use rounds) into the
    /// file delta this node contributes.
    fn parse_files(&self, text: &str) -> FileMap;

    /// Run the stage's eval command and report pass/fail.
    async fn eval(&self, workspace: &dyn Workspace) -> bool;

    /// Build the actor's typed output from the winning trajectory.
    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output;
}
