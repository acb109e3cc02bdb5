//! The five concrete [`search_tree::ActorProfile`] implementations (§4.2):
//! [`draft::DraftProfile`], [`handlers::HandlersProfile`],
//! [`index::IndexProfile`], [`frontend::FrontendProfile`], and
//! [`edit::EditProfile`].
//!
//! Every stage shares the same `BeamActor` expand/evaluate/select loop
//! (`search-tree`); what differs is captured here — prompt, tools, eval
//! command, and how the winning trajectory's files are turned into a
//! stage-specific output.

pub mod draft;
pub mod edit;
pub mod frontend;
pub mod handlers;
pub mod index;

use workspace::FileMap;

/// Shared output shape for every stage: the winning trajectory's merged
/// files and whether the run wrote anything at all (§4.1 "No-changes
/// detection").
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub files: FileMap,
    pub no_changes_applied: bool,
}

pub(crate) fn finish(files: FileMap, no_changes_applied: bool) -> StageOutput {
    StageOutput { files, no_changes_applied }
}

/// Run `cmd` in `workspace` and report whether it exited zero — the shared
/// eval shape for every stage (§4.2 table, "typecheck passes" / "typecheck +
/// tests pass" / etc. all reduce to one exit-code check).
pub(crate) async fn eval_command(workspace: &dyn workspace::Workspace, cmd: &str) -> bool {
    match workspace.exec(cmd).await {
        Ok(result) => result.success(),
        Err(_) => false,
    }
}
