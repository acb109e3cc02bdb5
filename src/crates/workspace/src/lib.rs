//! The `Workspace` contract: a disposable, cloneable, sandboxed filesystem
//! view with command execution and diffing, plus [`MemoryWorkspace`], an
//! in-memory fake adequate for unit and integration tests.
//!
//! A real container-backed implementation (the thing that actually builds
//! images and runs `npm test` inside them) is an external collaborator and
//! lives outside this crate.

pub mod error;
pub mod memory;
pub mod trait_def;

pub use error::{Result, WorkspaceError};
pub use memory::{MemoryWorkspace, ScriptedCommand};
pub use trait_def::{DirEntry, ExecResult, FileMap, Workspace};
