//! `GET /health` and `GET /health/dagger` (§4.7).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Plain liveness: if this handler runs at all, the process is up.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Checks the external sandbox is reachable. No sandbox provisioner is
/// wired into this reference server (it's an external collaborator, §1),
/// so this reports healthy unconditionally — a real deployment plugs a
/// provisioner liveness hook in here and returns 503 on failure.
pub async fn health_dagger(State(_state): State<AppState>) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "dagger": "not configured" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
