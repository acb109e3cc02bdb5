//! Concrete code-generation actors (§4.2): `DraftProfile`, `HandlersProfile`,
//! `IndexProfile`, `FrontendProfile`, `EditProfile` — one
//! [`search_tree::ActorProfile`] impl per pipeline stage, all sharing the
//! same [`search_tree::BeamActor`] expand/evaluate/select loop.
//!
//! The prompt/tool/eval differences between stages live in [`stages`]; the
//! read_file/write_file tool pair shared by the tool-driven stages lives in
//! [`tools`]; the `=== FILE: ===` text convention shared by the
//! text-emitting stages lives in [`parsing`].

pub mod error;
pub mod parsing;
pub mod stages;
pub mod tools;

pub use error::{ActorError, Result};
pub use stages::{
    draft::DraftProfile, edit::EditProfile, frontend::FrontendProfile, handlers::HandlersProfile,
    index::IndexProfile, StageOutput,
};
