//! Shared application state threaded through every axum handler via
//! `State<AppState>`: the loaded config, the session manager, and the
//! collaborators every [`agent_session::AgentSession`] needs.

use std::sync::Arc;

use fsm_checkpoint::SnapshotStore;
use llm::AsyncLLM;
use workspace::Workspace;

use crate::config::ServerConfig;
use crate::sessions::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionManager>,
    pub llm_for_actors: Arc<dyn AsyncLLM>,
    pub naming_llm: Arc<dyn AsyncLLM>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl AppState {
    /// A fresh in-memory session workspace. A production deployment swaps
    /// this for a call into the external sandbox provisioner (out of scope,
    /// §1); every other collaborator here is stable across that swap.
    pub fn new_session_workspace(&self) -> Arc<dyn Workspace> {
        Arc::new(workspace::MemoryWorkspace::empty())
    }

    pub fn session_deps(&self) -> agent_session::SessionDeps {
        agent_session::SessionDeps {
            llm_for_actors: self.llm_for_actors.clone(),
            naming_llm: self.naming_llm.clone(),
            workspace: self.new_session_workspace(),
            snapshots: self.snapshots.clone(),
        }
    }
}
