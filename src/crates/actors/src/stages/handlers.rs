//! Handlers actor (§4.2): current `server_files` → filled-in handler
//! implementations with co-located tests. Evaluated by typecheck + unit
//! tests against a Postgres-linked container (the container itself lives in
//! the `Workspace` the caller constructs; this profile only issues the
//! command).

use async_trait::async_trait;
use search_tree::ActorProfile;
use workspace::{FileMap, Workspace};

use super::{eval_command, finish, StageOutput};
use crate::parsing::parse_file_blocks;

pub struct HandlersProfile {
    pub server_files: FileMap,
    pub feedback: Option<String>,
    pub beam_width: usize,
    pub max_depth: usize,
}

impl HandlersProfile {
    pub fn new(server_files: FileMap, feedback: Option<String>) -> Self {
        Self { server_files, feedback, beam_width: 3, max_depth: 4 }
    }
}

#[async_trait]
impl ActorProfile for HandlersProfile {
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
            "Fill in the tRPC handler implementations for this server, adding a co-located test \
             file per handler. Current server files:\n{}\n\n\
             Emit only changed/added files as `=== FILE: <path> ===` / `=== END FILE ===` blocks.",
            listing
        );
        if let Some(feedback) = &self.feedback {
            prompt.push_str(&format!("\n\nReviewer feedback to address:\n{}", feedback));
        }
        Some(prompt)
    }

    fn parse_files(&self, text: &str) -> FileMap {
        parse_file_blocks(text)
    }

    async fn eval(&self, workspace: &dyn Workspace) -> bool {
        eval_command(workspace, "npm run typecheck --prefix server && npm test --prefix server").await
    }

    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output {
        finish(files, no_changes_applied)
    }
}
