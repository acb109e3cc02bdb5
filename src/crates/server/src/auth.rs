//! Bearer-token auth middleware (§6.1 "Auth"), grounded on the teacher's
//! `security_middleware` (`config/server/security.rs`): a request missing
//! `Authorization` is 401, a mismatching token is 403, and auth is skipped
//! entirely when no token is configured.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

pub async fn require_bearer_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.config.bearer_token.as_deref() else {
        return next.run(request).await;
    };

    let Some(header) = request.headers().get(axum::http::header::AUTHORIZATION) else {
        return ServerError::Unauthenticated.into_response();
    };
    let Ok(header) = header.to_str() else {
        return ServerError::Unauthenticated.into_response();
    };
    let Some(presented) = header.strip_prefix("Bearer ") else {
        return ServerError::Unauthenticated.into_response();
    };

    if presented == expected {
        next.run(request).await
    } else {
        ServerError::Forbidden.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, SnapshotBackend};
    use crate::sessions::SessionManager;
    use axum::body::Body;
    use axum::http::{header, Method, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state_with_token(token: &str) -> AppState {
        AppState {
            config: Arc::new(ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                bearer_token: Some(token.to_string()),
                snapshot_backend: SnapshotBackend::Memory,
                request_timeout: Duration::from_secs(1),
                max_tokens: 1,
                temperature: None,
            }),
            sessions: Arc::new(SessionManager::new()),
            llm_for_actors: Arc::new(llm::ScriptedLLM::new(vec![])),
            naming_llm: Arc::new(llm::ScriptedLLM::new(vec![])),
            snapshots: Arc::new(fsm_checkpoint::InMemorySnapshotStore::new()),
        }
    }

    fn guarded_router(state: AppState) -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(state.clone(), require_bearer_token))
            .with_state(state)
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let app = guarded_router(state_with_token("s3cret"));
        let response = app
            .oneshot(axum::http::Request::builder().method(Method::GET).uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_token_is_403() {
        let app = guarded_router(state_with_token("s3cret"));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/protected")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn correct_token_is_200() {
        let app = guarded_router(state_with_token("s3cret"));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/protected")
                    .header(header::AUTHORIZATION, "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn no_token_configured_skips_auth() {
        let mut state = state_with_token("s3cret");
        Arc::make_mut(&mut state.config).bearer_token = None;
        let app = guarded_router(state);
        let response = app
            .oneshot(axum::http::Request::builder().method(Method::GET).uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
