//! Frontend actor (§4.2): user prompt + final `server_files` →
//! `client/src/**` React app. Tool-driven: the LLM reads/writes files
//! directly against the node's workspace instead of emitting a text blob
//! (§4.1 "Tool use in expansion"). Evaluated by typecheck + build.

use async_trait::async_trait;
use search_tree::{ActorProfile, ToolOutcome};
use serde_json::Value;
use workspace::{FileMap, Workspace};

use super::{eval_command, finish, StageOutput};
use crate::tools::{dispatch_file_tool, read_file_tool, write_file_tool};

pub struct FrontendProfile {
    pub user_prompt: String,
    pub server_files: FileMap,
    pub feedback: Option<String>,
    pub beam_width: usize,
    pub max_depth: usize,
}

impl FrontendProfile {
    pub fn new(user_prompt: impl Into<String>, server_files: FileMap, feedback: Option<String>) -> Self {
        Self { user_prompt: user_prompt.into(), server_files, feedback, beam_width: 2, max_depth: 4 }
    }
}

#[async_trait]
impl ActorProfile for FrontendProfile {
    type Output = StageOutput;

    fn beam_width(&self) -> usize {
        self.beam_width
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn system_prompt(&self) -> Option<String> {
        let listing = self.server_files.keys().cloned().collect::<Vec<_>>().join("\n");
        let mut prompt = format!(
            "Build the React client under client/src for this application:\n\n{}\n\n\
             The finalized tRPC server exposes these files:\n{}\n\n\
             Use read_file/write_file to inspect and author the client tree directly. Stop \
             requesting tools once the client is complete.",
            self.user_prompt, listing
        );
        if let Some(feedback) = &self.feedback {
            prompt.push_str(&format!("\n\nReviewer feedback to address:\n{}", feedback));
        }
        Some(prompt)
    }

    fn tools(&self) -> Vec<llm::ToolDefinition> {
        vec![read_file_tool(), write_file_tool()]
    }

    async fn apply_tool(&self, workspace: &dyn Workspace, name: &str, input: &Value) -> ToolOutcome {
        dispatch_file_tool(workspace, name, input).await
    }

    fn parse_files(&self, _text: &str) -> FileMap {
        FileMap::new()
    }

    async fn eval(&self, workspace: &dyn Workspace) -> bool {
        eval_command(workspace, "npm run typecheck --prefix client && npm run build --prefix client").await
    }

    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output {
        finish(files, no_changes_applied)
    }
}
