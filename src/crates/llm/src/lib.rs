//! The `AsyncLLM` contract and its reference adapter.
//!
//! This crate is deliberately small: a single trait
//! ([`AsyncLLM`](types::AsyncLLM)) that beam-search actors and the FSM tool
//! processor drive, one concrete adapter against an Anthropic-compatible
//! messages endpoint ([`claude::ClaudeClient`]), and a scripted double
//! ([`mock::ScriptedLLM`]) for exercising callers without a network.
//!
//! Swapping in a different provider means implementing [`AsyncLLM`] — no
//! other crate in the workspace depends on adapter internals.

pub mod claude;
pub mod config;
pub mod error;
pub mod mock;
pub mod types;

pub use claude::ClaudeClient;
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use mock::ScriptedLLM;
pub use types::{
    AsyncLLM, Completion, CompletionRequest, ContentBlock, Message, Role, StopReason,
    ToolChoice, ToolDefinition, Usage,
};
