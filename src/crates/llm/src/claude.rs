//! Reference `AsyncLLM` adapter: a minimal HTTP client against an
//! Anthropic-compatible `/v1/messages` endpoint.
//!
//! This is the one concrete provider this crate ships. It exists to prove
//! the `AsyncLLM` contract is implementable over a real wire format, not to
//! cover the space of providers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tooling::async_utils::retry::{with_retry, RetryPolicy};

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::types::{
    AsyncLLM, Completion, CompletionRequest, ContentBlock, Role, StopReason, ToolChoice, Usage,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages-API client.
#[derive(Clone)]
pub struct ClaudeClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl ClaudeClient {
    pub fn new(config: RemoteLlmConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.max_retries as usize)
    }

    async fn send_once(&self, body: &WireRequest) -> Result<WireResponse> {
        let url = format!("{}/v1/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(text),
                429 => LlmError::RateLimited(text),
                400..=499 => LlmError::InvalidRequest(text),
                _ => LlmError::Provider(format!("{}: {}", status, text)),
            });
        }

        response.json().await.map_err(LlmError::Transport)
    }
}

#[async_trait]
impl AsyncLLM for ClaudeClient {
    async fn completion(&self, request: CompletionRequest) -> Result<Completion> {
        let body = to_wire_request(&self.config, &request);
        let policy = self.retry_policy();

        let wire = with_retry(&policy, || self.send_once(&body)).await?;

        Ok(from_wire_response(wire))
    }
}

fn to_wire_request(config: &RemoteLlmConfig, request: &CompletionRequest) -> WireRequest {
    let messages = request
        .messages
        .iter()
        .map(|m| WireMessage {
            role: match m.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: m.content.iter().map(to_wire_block).collect(),
        })
        .collect();

    let tools = request
        .tools
        .iter()
        .map(|t| WireTool {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.input_schema.clone(),
        })
        .collect::<Vec<_>>();

    WireRequest {
        model: request.model.clone().unwrap_or_else(|| config.model.clone()),
        messages,
        system: request.system.clone(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools: if tools.is_empty() { None } else { Some(tools) },
        tool_choice: request.tool_choice.as_ref().map(to_wire_tool_choice),
        stream: false,
    }
}

fn to_wire_block(block: &ContentBlock) -> WireContentBlock {
    match block {
        ContentBlock::TextRaw { text } => WireContentBlock::Text { text: text.clone() },
        ContentBlock::ToolUse { id, name, input } => WireContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        ContentBlock::ThinkingBlock { thinking } => WireContentBlock::Thinking {
            thinking: thinking.clone(),
        },
    }
}

fn to_wire_tool_choice(choice: &ToolChoice) -> WireToolChoice {
    match choice {
        ToolChoice::Auto => WireToolChoice::Auto,
        ToolChoice::Any => WireToolChoice::Any,
        ToolChoice::Tool { name } => WireToolChoice::Tool { name: name.clone() },
    }
}

fn from_wire_response(resp: WireResponse) -> Completion {
    let content = resp
        .content
        .into_iter()
        .map(|block| match block {
            WireContentBlock::Text { text } => ContentBlock::TextRaw { text },
            WireContentBlock::ToolUse { id, name, input } => {
                ContentBlock::ToolUse { id, name, input }
            }
            WireContentBlock::Thinking { thinking } => ContentBlock::ThinkingBlock { thinking },
        })
        .collect();

    let stop_reason = match resp.stop_reason.as_deref() {
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        Some("tool_use") => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    };

    Completion {
        content,
        stop_reason,
        usage: Usage {
            input_tokens: resp.usage.input_tokens,
            output_tokens: resp.usage.output_tokens,
        },
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<WireToolChoice>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: Vec<WireContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: serde_json::Value },
    Thinking { thinking: String },
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireToolChoice {
    Auto,
    Any,
    Tool { name: String },
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: Vec<WireContentBlock>,
    stop_reason: Option<String>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: usize,
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn wire_request_falls_back_to_config_model() {
        let config = RemoteLlmConfig::new("test-key", "https://api.anthropic.com", "claude-3-5-sonnet");
        let request = CompletionRequest::new(vec![Message::user("hi")], 1024);
        let wire = to_wire_request(&config, &request);
        assert_eq!(wire.model, "claude-3-5-sonnet");
        assert!(wire.tools.is_none());
    }

    #[test]
    fn wire_request_honors_model_override() {
        let config = RemoteLlmConfig::new("test-key", "https://api.anthropic.com", "claude-3-5-sonnet");
        let request = CompletionRequest::new(vec![Message::user("hi")], 1024).with_model("claude-3-opus");
        let wire = to_wire_request(&config, &request);
        assert_eq!(wire.model, "claude-3-opus");
    }

    #[test]
    fn stop_reason_maps_tool_use() {
        let resp = WireResponse {
            content: vec![WireContentBlock::ToolUse {
                id: "t1".into(),
                name: "confirm_state".into(),
                input: serde_json::json!({}),
            }],
            stop_reason: Some("tool_use".to_string()),
            usage: WireUsage { input_tokens: 10, output_tokens: 5 },
        };
        let completion = from_wire_response(resp);
        assert_eq!(completion.stop_reason, StopReason::ToolUse);
        assert_eq!(completion.tool_uses().len(), 1);
    }
}
