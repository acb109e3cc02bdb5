//! Typed server configuration (§4.7 "ambient server concerns"): bind
//! address, bearer token, snapshot backend, and request timeouts, loaded
//! from environment variables with sensible defaults, in the same style as
//! [`llm::RemoteLlmConfig::from_env`].

use std::time::Duration;

use tooling::config::{get_env, get_env_bool, get_env_or, get_env_parse_or};

use crate::error::{Result, ServerError};

/// Where persisted FSM snapshots land. `Memory` is the default (adequate
/// for a single-process deployment and for tests); `File` points at a
/// directory of one JSON-lines file per trace.
#[derive(Debug, Clone)]
pub enum SnapshotBackend {
    Memory,
    File(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `BUILDER_TOKEN`: when set, `POST /message` requires a matching
    /// bearer token (§6.1 "Auth"). Unset means auth is skipped.
    pub bearer_token: Option<String>,
    pub snapshot_backend: SnapshotBackend,
    pub request_timeout: Duration,
    /// Max tokens passed to the outer tool-calling LLM turn (§4.5 `step`).
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl ServerConfig {
    /// Loads every field from the environment, falling back to defaults
    /// matched to local development: `127.0.0.1:8080`, in-memory
    /// snapshots, no auth.
    pub fn from_env() -> Result<Self> {
        let host = get_env_or("HOST", "127.0.0.1").map_err(config_err)?;
        let port = get_env_parse_or("PORT", 8080u16).map_err(config_err)?;
        let bearer_token = get_env("BUILDER_TOKEN").map_err(config_err)?;
        let snapshot_dir = get_env("SNAPSHOT_DIR").map_err(config_err)?;
        let snapshot_backend = match snapshot_dir {
            Some(dir) => SnapshotBackend::File(dir),
            None => SnapshotBackend::Memory,
        };
        let timeout_secs = get_env_parse_or("REQUEST_TIMEOUT_SECS", 300u64).map_err(config_err)?;
        let max_tokens = get_env_parse_or("AGENT_MAX_TOKENS", 4096usize).map_err(config_err)?;
        let temperature = get_env("AGENT_TEMPERATURE").map_err(config_err)?.and_then(|s| s.parse::<f32>().ok());
        let _cors = get_env_bool("ENABLE_CORS").map_err(config_err)?.unwrap_or(true);

        Ok(Self {
            host,
            port,
            bearer_token,
            snapshot_backend,
            request_timeout: Duration::from_secs(timeout_secs),
            max_tokens,
            temperature,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn config_err(e: tooling::ToolingError) -> ServerError {
    ServerError::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_with_no_env_set() {
        // SAFETY-by-convention: tests in this module don't run concurrently
        // with ones that set these same vars (no other test in this crate does).
        std::env::remove_var("BUILDER_TOKEN");
        std::env::remove_var("SNAPSHOT_DIR");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.bearer_token.is_none());
        assert!(matches!(config.snapshot_backend, SnapshotBackend::Memory));
    }

    #[test]
    fn bind_addr_formats_host_and_port() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9090,
            bearer_token: None,
            snapshot_backend: SnapshotBackend::Memory,
            request_timeout: Duration::from_secs(1),
            max_tokens: 1,
            temperature: None,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
    }
}
