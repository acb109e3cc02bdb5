//! Edit actor (§4.2): existing files + user prompt → targeted edits via
//! read/write tools. Used both for plain `REVIEW_*` feedback loops and — per
//! §4.4 — for post-`COMPLETE` refinement passes over the whole project.
//! Evaluated by typecheck + the existing test suite.

use async_trait::async_trait;
use search_tree::{ActorProfile, ToolOutcome};
use serde_json::Value;
use workspace::{FileMap, Workspace};

use super::{eval_command, finish, StageOutput};
use crate::tools::{dispatch_file_tool, read_file_tool, write_file_tool};

pub struct EditProfile {
    pub instructions: String,
    pub existing_files: FileMap,
    pub beam_width: usize,
    pub max_depth: usize,
}

impl EditProfile {
    pub fn new(instructions: impl Into<String>, existing_files: FileMap) -> Self {
        Self { instructions: instructions.into(), existing_files, beam_width: 2, max_depth: 3 }
    }
}

#[async_trait]
impl ActorProfile for EditProfile {
    type Output = StageOutput;

    fn beam_width(&self) -> usize {
        self.beam_width
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn system_prompt(&self) -> Option<String> {
        let listing = self.existing_files.keys().cloned().collect::<Vec<_>>().join("\n");
        Some(format!(
            "Apply this request as a targeted edit to the existing project, touching as few files \
             as necessary:\n\n{}\n\n\
             Existing files:\n{}\n\n\
             Use read_file/write_file. If the request needs no code change, make no tool calls.",
            self.instructions, listing
        ))
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
        eval_command(workspace, "npm run typecheck && npm test").await
    }

    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output {
        finish(files, no_changes_applied)
    }
}
