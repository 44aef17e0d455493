//! Shared test fixtures for the CAMI workspace.
//!
//! Dev-dependency only. Fixtures write plain files so that any crate can use
//! them without depending on `cami-core`.
//!
//! # Modules
//!
//! - [`agents`]: agent markdown files
//! - [`git`]: git repository fixtures
//! - [`workspace`]: [`TestWorkspace`] with sources and projects

pub mod agents;
pub mod git;
pub mod workspace;

pub use agents::{agent_markdown, write_agent};
pub use workspace::TestWorkspace;
