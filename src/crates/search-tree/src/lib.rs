//! The search tree and generic beam-search actor driver (§3 "Node", §4.1).
//!
//! [`Tree`] is the arena-based DAG every actor expands into; [`BeamActor`]
//! is the one expand/evaluate/select loop every concrete stage actor
//! (`actors` crate) shares, parameterized by an [`ActorProfile`].

pub mod driver;
pub mod error;
pub mod profile;
pub mod tree;

pub use driver::{ActorResult, BeamActor};
pub use error::{Result, SearchTreeError};
pub use profile::{ActorProfile, ToolOutcome};
pub use tree::{Node, NodeId, Tree};
