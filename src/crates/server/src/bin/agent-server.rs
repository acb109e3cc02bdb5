//! Standalone binary for the code-generation agent server.
//!
//! Loads configuration from the environment, wires the `AsyncLLM` and
//! `SnapshotStore` collaborators, builds the axum router, and serves
//! `text/event-stream` responses until a shutdown signal arrives.

use std::sync::Arc;

use fsm_checkpoint::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore};
use llm::{ClaudeClient, RemoteLlmConfig};
use server::config::SnapshotBackend;
use server::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    tracing::info!("loading server configuration");
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, auth_enabled = config.bearer_token.is_some(), "configuration loaded");

    let llm_config = RemoteLlmConfig::from_env(
        "ANTHROPIC_API_KEY",
        std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
        std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string()),
    )?;
    let llm_for_actors: Arc<dyn llm::AsyncLLM> = Arc::new(ClaudeClient::new(llm_config.clone()));

    let naming_model = std::env::var("ANTHROPIC_NAMING_MODEL").unwrap_or_else(|_| "claude-haiku-4-5".to_string());
    let naming_llm: Arc<dyn llm::AsyncLLM> = Arc::new(ClaudeClient::new(RemoteLlmConfig::new(
        llm_config.api_key.clone(),
        llm_config.base_url.clone(),
        naming_model,
    )));

    let snapshots: Arc<dyn SnapshotStore> = match &config.snapshot_backend {
        SnapshotBackend::Memory => Arc::new(InMemorySnapshotStore::new()),
        SnapshotBackend::File(dir) => Arc::new(FileSnapshotStore::new(dir.clone())),
    };

    let addr = config.bind_addr();
    let state = AppState {
        config: Arc::new(config),
        sessions: Arc::new(server::sessions::SessionManager::new()),
        llm_for_actors,
        naming_llm,
        snapshots,
    };

    let app = server::create_router(state);

    tracing::info!(%addr, "starting agent server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("agent server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received CTRL-C, draining in-flight SSE streams");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, draining in-flight SSE streams");
        }
    }
}
