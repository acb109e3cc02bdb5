//! Configuration for the remote LLM adapter.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an Anthropic-compatible messages endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API, e.g. `https://api.anthropic.com`.
    pub base_url: String,

    /// Default model name/identifier, used when a call does not override it.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Maximum retries performed by the shared backoff helper for transport errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RemoteLlmConfig {
    /// Create a new remote LLM configuration.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
        }
    }

    /// Create configuration from an environment variable holding the API key.
    pub fn from_env(env_var: &str, base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::ApiKeyNotFound(format!("environment variable: {}", env_var)))?;
        Ok(Self::new(api_key, base_url, model))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_max_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RemoteLlmConfig::new("test-key", "https://api.anthropic.com", "claude-3-5-sonnet")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5);

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
    }
}
