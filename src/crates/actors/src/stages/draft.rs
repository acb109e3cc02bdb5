//! Draft actor (§4.2): user prompt (+ optional prior feedback) → initial
//! `server/` skeleton. Evaluated by a TypeScript typecheck.

use async_trait::async_trait;
use search_tree::ActorProfile;
use workspace::{FileMap, Workspace};

use super::{eval_command, finish, StageOutput};
use crate::parsing::parse_file_blocks;

pub struct DraftProfile {
    pub user_prompt: String,
    pub feedback: Option<String>,
    pub beam_width: usize,
    pub max_depth: usize,
}

impl DraftProfile {
    pub fn new(user_prompt: impl Into<String>, feedback: Option<String>) -> Self {
        Self { user_prompt: user_prompt.into(), feedback, beam_width: 3, max_depth: 4 }
    }
}

#[async_trait]
impl ActorProfile for DraftProfile {
    type Output = StageOutput;

    fn beam_width(&self) -> usize {
        self.beam_width
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn system_prompt(&self) -> Option<String> {
        let mut prompt = format!(
            "You are drafting the initial server skeleton for a tRPC + Drizzle + Zod backend \
             implementing this application:\n\n{}\n\n\
             Emit each file as a `=== FILE: <path> ===` / `=== END FILE ===` block. Cover zod \
             schemas, the drizzle schema, stub handlers, and the tRPC router index.",
            self.user_prompt
        );
        if let Some(feedback) = &self.feedback {
            prompt.push_str(&format!("\n\nAddress this reviewer feedback on the previous draft:\n{}", feedback));
        }
        Some(prompt)
    }

    fn parse_files(&self, text: &str) -> FileMap {
        parse_file_blocks(text)
    }

    async fn eval(&self, workspace: &dyn Workspace) -> bool {
        eval_command(workspace, "npm run typecheck --prefix server").await
    }

    fn finish(&self, files: FileMap, no_changes_applied: bool) -> Self::Output {
        finish(files, no_changes_applied)
    }
}
