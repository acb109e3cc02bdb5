//! The `AsyncLLM` contract: the single external collaborator beam-search
//! actors and the FSM tool processor drive through.
//!
//! Every provider-specific adapter, and the scripted [`mock`](crate::mock)
//! double used in tests, implements [`AsyncLLM`]. Callers never downcast to
//! an adapter's concrete type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A single message in a completion request's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::TextRaw { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message or completion content.
///
/// The three variants mirror what an Anthropic-style messages endpoint can
/// return: raw text, a tool invocation the caller must dispatch, or an
/// extended-thinking block some models emit before their answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    TextRaw { text: String },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ThinkingBlock { thinking: String },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::TextRaw { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<(&str, &str, &Value)> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some((id, name, input)),
            _ => None,
        }
    }
}

/// A tool schema offered to the model, Anthropic tool-use shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// How the model should choose among the offered tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    Auto,
    Any,
    Tool { name: String },
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
}

/// Input/output token counts reported alongside a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// The result of one `AsyncLLM::completion` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl Completion {
    /// The concatenation of every `TextRaw` block, in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// All `ToolUse` blocks, in order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use).collect()
    }
}

/// Parameters for a single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, max_tokens: usize) -> Self {
        Self {
            messages,
            system: None,
            max_tokens,
            temperature: None,
            tools: Vec::new(),
            tool_choice: None,
            model: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// The one operation every LLM adapter must provide.
///
/// A tool-enabled implementation MUST faithfully echo the caller's tool
/// schema contract: it must not invent tools outside `tools`, and must
/// respect `tool_choice` when set.
#[async_trait]
pub trait AsyncLLM: Send + Sync {
    async fn completion(&self, request: CompletionRequest) -> Result<Completion>;
}
