//! The HTTP/SSE front door (§4.7, component I): auth, request validation,
//! session lookup, and stream multiplexing sit here; everything else
//! (restoring checkpoints, running the FSM loop, diffing, emitting events)
//! lives in `agent-session` and below. This crate only adapts that engine
//! to the wire.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sessions;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::create_router;
pub use state::AppState;
