//! Index actor (§4.2): current `server_files` → finalized tRPC index
//! wiring. Evaluated by typecheck + a healthcheck boot.

use async_trait::async_trait;
use search_tree::ActorProfile;
use workspace::{FileMap, Workspace};

use super::{eval_command, finish, StageOutput};
use crate::parsing::parse_file_blocks;

pub struct IndexProfile {
    pub server_files: FileMap,
    pub feedback: Option<String>,
    pub beam_width: usize,
    pub max_depth: usize,
}

impl IndexProfile {
    pub fn new(server_files: FileMap, feedback: Option<String>) -> Self {
        Self { server_files, feedback, beam_width: 2, max_depth: 3 }
    }
}

#[async_trait]
impl ActorProfile for IndexProfile {
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
            "Finalize the tRPC router index, wiring every handler into the exported router. \
             Current server files:\n{}\n\n\
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
        eval_command(workspace, "npm run typecheck --prefix server && npm run healthcheck --prefix server").await
    }

    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output {
        finish(files, no_changes_applied)
    }
}
