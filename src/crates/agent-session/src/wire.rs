//! The HTTP/SSE wire types (§6.1): `AgentRequest` in, `AgentSseEvent` out.
//! Field names are camelCase on the wire; unknown fields are ignored rather
//! than rejected, so older/newer clients can add fields without breaking
//! this server.

use serde::{Deserialize, Serialize};

/// One turn of the client-visible conversation, as sent in `allMessages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    pub content: String,
}

/// A file as the client last saw it, used as the diff baseline (§4.6 step 4a).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

/// Prior checkpoint handed back by the client on a resumed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub fsm_state: fsm_core::Checkpoint,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub all_messages: Vec<AgentMessage>,
    pub application_id: String,
    pub trace_id: String,
    #[serde(default)]
    pub all_files: Option<Vec<FileEntry>>,
    #[serde(default)]
    pub agent_state: Option<AgentState>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Running,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    StageResult,
    ReviewResult,
    RefinementRequest,
    RuntimeError,
    KeepAlive,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSseMessage {
    pub role: String,
    pub kind: MessageKind,
    pub content: String,
    pub agent_state: Option<AgentState>,
    pub unified_diff: Option<String>,
    pub app_name: Option<String>,
    pub commit_message: Option<String>,
}

impl AgentSseMessage {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            kind,
            content: content.into(),
            agent_state: None,
            unified_diff: None,
            app_name: None,
            commit_message: None,
        }
    }

    pub fn with_agent_state_opt(mut self, fsm_state: Option<fsm_core::Checkpoint>) -> Self {
        self.agent_state = fsm_state.map(|fsm_state| AgentState { fsm_state });
        self
    }

    pub fn with_diff(mut self, unified_diff: impl Into<String>) -> Self {
        self.unified_diff = Some(unified_diff.into());
        self
    }

    pub fn with_app_name(mut self, app_name: Option<String>) -> Self {
        self.app_name = app_name;
        self
    }

    pub fn with_commit_message(mut self, commit_message: impl Into<String>) -> Self {
        self.commit_message = Some(commit_message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSseEvent {
    pub status: AgentStatus,
    pub trace_id: String,
    pub message: AgentSseMessage,
}
