//! Route table (§4.7), grounded on the teacher's `api::routes::create_router`:
//! one `Router<AppState>` wiring health checks and the `/message` SSE
//! endpoint, with the bearer-token layer scoped to `/message` only — health
//! checks stay reachable without a token for container orchestrators.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer_token;
use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let message_routes = Router::new()
        .route("/message", post(handlers::post_message))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/health/dagger", get(handlers::health_dagger))
        .merge(message_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, SnapshotBackend};
    use crate::sessions::SessionManager;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            config: Arc::new(ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                bearer_token: None,
                snapshot_backend: SnapshotBackend::Memory,
                request_timeout: Duration::from_secs(1),
                max_tokens: 64,
                temperature: None,
            }),
            sessions: Arc::new(SessionManager::new()),
            llm_for_actors: Arc::new(llm::ScriptedLLM::new(vec![])),
            naming_llm: Arc::new(llm::ScriptedLLM::new(vec![])),
            snapshots: Arc::new(fsm_checkpoint::InMemorySnapshotStore::new()),
        }
    }

    #[tokio::test]
    async fn health_endpoint_is_reachable_without_auth() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().method(Method::GET).uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_dagger_endpoint_is_reachable() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().method(Method::GET).uri("/health/dagger").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_message_body_is_422() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/message")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
