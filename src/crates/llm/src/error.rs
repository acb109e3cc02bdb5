//! Error types for LLM provider implementations.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when working with LLM providers.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport failure (connection refused, DNS, timeout, 5xx). Retryable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API authentication failed. Not retryable.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded. Retryable with backoff.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Request parameters rejected by the provider (4xx other than auth/rate-limit).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response body did not match the expected schema.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// API key missing from the environment/config.
    #[error("api key not found: {0}")]
    ApiKeyNotFound(String),

    /// Generic provider-side failure not covered above.
    #[error("provider error: {0}")]
    Provider(String),
}

impl LlmError {
    /// Whether a caller should retry this error via the shared backoff helper.
    ///
    /// Only transport-level failures are retryable here; a model producing a
    /// malformed tool call or a 4xx from a bad request is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Transport(_) | LlmError::RateLimited(_))
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::InvalidResponse(err.to_string())
    }
}
