//! HTTP-facing error type: every failure surfaced by a route handler
//! converts to a stable `(status, code, message)` shape (§4.8 "Error
//! handling"), matching the non-streaming "Error envelope" in §6.1.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("missing bearer token")]
    Unauthenticated,

    #[error("invalid bearer token")]
    Forbidden,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The non-SSE error envelope from §6.1: `{ "error": ..., "details": ... }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "Unauthorized",
            StatusCode::UNPROCESSABLE_ENTITY => "Unprocessable Entity",
            _ => "Internal Server Error",
        };
        tracing::error!(error = %self, "request failed");
        (status, Json(ErrorBody { error, details: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_maps_to_401() {
        assert_eq!(ServerError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(ServerError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn malformed_request_maps_to_422() {
        assert_eq!(ServerError::MalformedRequest("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
