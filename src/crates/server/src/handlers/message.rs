//! `POST /message` (§4.7, §6.1): validates the request, claims a session
//! slot, runs `AgentSession::process` on a background task, and streams
//! its emitted events back as `text/event-stream`.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

use agent_session::{AgentRequest, AgentSession};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// `allMessages`/`applicationId`/`traceId` are the only wire fields §6.1
/// marks required; everything else defaults when absent.
fn validate(request: &AgentRequest) -> Result<()> {
    if request.application_id.trim().is_empty() {
        return Err(ServerError::MalformedRequest("applicationId must not be empty".to_string()));
    }
    if request.trace_id.trim().is_empty() {
        return Err(ServerError::MalformedRequest("traceId must not be empty".to_string()));
    }
    if request.all_messages.is_empty() {
        return Err(ServerError::MalformedRequest("allMessages must not be empty".to_string()));
    }
    Ok(())
}

pub async fn post_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let request: AgentRequest =
        serde_json::from_slice(&body).map_err(|e| ServerError::MalformedRequest(e.to_string()))?;
    validate(&request)?;

    let guard = state.sessions.acquire(&request.application_id, &request.trace_id)?;
    let session = AgentSession::new(request.application_id.clone(), request.trace_id.clone());
    let deps = state.session_deps();

    // Capacity-1 handoff approximates §5's "bounded channel of capacity 0":
    // the producer stalls until the HTTP writer has drained the prior event.
    let (tx, rx) = tokio::sync::mpsc::channel(1);

    tokio::spawn(async move {
        let _guard = guard;
        session.process(request, deps, tx).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default().data(payload))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_session::{AgentMessage, FileEntry};

    fn request() -> AgentRequest {
        AgentRequest {
            all_messages: vec![AgentMessage { role: "user".to_string(), content: "hi".to_string() }],
            application_id: "a1".to_string(),
            trace_id: "t1".to_string(),
            all_files: None::<Vec<FileEntry>>,
            agent_state: None,
            settings: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn empty_application_id_is_rejected() {
        let mut request = request();
        request.application_id = String::new();
        assert!(validate(&request).is_err());
    }

    #[test]
    fn empty_trace_id_is_rejected() {
        let mut request = request();
        request.trace_id = String::new();
        assert!(validate(&request).is_err());
    }

    #[test]
    fn empty_messages_is_rejected() {
        let mut request = request();
        request.all_messages.clear();
        assert!(validate(&request).is_err());
    }
}
