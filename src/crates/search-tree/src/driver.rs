//! `BeamActor`: the single generic expand/evaluate/select loop shared by
//! every concrete actor (§4.1/§4.2). A concrete actor is a thin
//! [`ActorProfile`] implementation plus this driver.

use llm::{AsyncLLM, Completion, CompletionRequest, Message, StopReason};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use workspace::Workspace;

use crate::error::{Result, SearchTreeError};
use crate::profile::ActorProfile;
use crate::tree::{NodeId, Tree};

/// The outcome of a successful actor run.
pub struct ActorResult<O> {
    pub output: O,
    pub no_changes_applied: bool,
}

pub struct BeamActor<P: ActorProfile> {
    profile: Arc<P>,
    llm: Arc<dyn AsyncLLM>,
}

impl<P: ActorProfile> BeamActor<P> {
    pub fn new(profile: Arc<P>, llm: Arc<dyn AsyncLLM>) -> Self {
        Self { profile, llm }
    }

    /// Run the beam search to completion: expand frontier nodes in
    /// parallel, evaluate every new leaf, and return the first solution
    /// found. Fails if no leaf passes `eval` within `max_depth` rounds.
    #[instrument(skip_all, fields(beam_width = self.profile.beam_width(), max_depth = self.profile.max_depth()))]
    pub async fn execute(&self, seed: Vec<Message>, workspace: Box<dyn Workspace>) -> Result<ActorResult<P::Output>> {
        let mut tree = Tree::new(workspace, seed);
        let root = tree.root();
        let max_depth = self.profile.max_depth();
        let beam_width = self.profile.beam_width().max(1);

        for depth in 0..max_depth {
            let frontier = if depth == 0 {
                vec![root; beam_width]
            } else {
                tree.leaves()
            };

            debug!(depth, frontier_size = frontier.len(), "expanding frontier");

            let expansions: Vec<_> =
                futures::future::join_all(frontier.iter().map(|&id| self.expand(&tree, id))).await;

            let mut new_leaves = Vec::with_capacity(expansions.len());
            for (parent, expansion) in frontier.into_iter().zip(expansions) {
                let expansion = expansion?;
                let child = tree.add_child(parent, expansion.workspace, expansion.messages, expansion.files);
                new_leaves.push(child);
            }

            for &leaf in &new_leaves {
                if self.profile.eval(tree.get(leaf).workspace.as_ref()).await {
                    info!(depth, "actor found a solution");
                    let files = tree.trajectory_files(leaf);
                    let no_changes_applied = files.is_empty();
                    let output = self.profile.finish(files, no_changes_applied);
                    return Ok(ActorResult { output, no_changes_applied });
                }
            }
        }

        Err(SearchTreeError::MaxDepthExceeded(max_depth))
    }

    /// Expand a single frontier node: assemble its trajectory, call the
    /// LLM, resolve any tool_use rounds against a cloned workspace, and
    /// return the node's file/message delta.
    async fn expand(&self, tree: &Tree, node: NodeId) -> Result<Expansion> {
        let workspace = tree.get(node).workspace.clone_workspace();
        let mut messages = tree.trajectory_messages(node);
        let mut new_messages = Vec::new();
        let mut written_files = workspace::FileMap::new();

        loop {
            let request = CompletionRequest::new(messages.clone(), 8192)
                .with_tools(self.profile.tools());
            let request = match self.profile.system_prompt() {
                Some(system) => request.with_system(system),
                None => request,
            };
            let request = match self.profile.tool_choice() {
                Some(choice) => request.with_tool_choice(choice),
                None => request,
            };

            let completion: Completion = self.llm.completion(request).await?;
            let assistant_message = Message::assistant(completion.content.clone());
            messages.push(assistant_message.clone());
            new_messages.push(assistant_message);

            if completion.stop_reason != StopReason::ToolUse || self.profile.tools().is_empty() {
                // `parse_files` covers actors that describe their output as
                // completion text; tool-driven actors have already written
                // everything into `written_files` below, and last-writer-wins
                // means a closing text-parsed file can still override one.
                let mut files = written_files;
                files.extend(self.profile.parse_files(&completion.text()));
                return Ok(Expansion { workspace, messages: new_messages, files });
            }

            let tool_uses = completion.tool_uses();
            let mut result_blocks = Vec::new();

            for (id, name, input) in tool_uses {
                let outcome = self.profile.apply_tool(workspace.as_ref(), name, input).await;
                if let Some((path, content)) = outcome.written.clone() {
                    written_files.insert(path, content);
                }
                result_blocks.push(llm::ContentBlock::TextRaw {
                    text: format!(
                        "[tool_result id={} error={}] {}",
                        id, outcome.is_error, outcome.result_text
                    ),
                });
            }

            let tool_result_message = Message {
                role: llm::Role::User,
                content: result_blocks,
            };
            messages.push(tool_result_message.clone());
            new_messages.push(tool_result_message);
        }
    }
}

struct Expansion {
    workspace: Box<dyn Workspace>,
    messages: Vec<Message>,
    files: workspace::FileMap,
}
