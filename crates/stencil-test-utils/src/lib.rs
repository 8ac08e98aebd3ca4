//! Shared test utilities for the stencil workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`] - git repository fixtures
//! - [`project`] - [`TestProject`](project::TestProject) builder for project trees
//! - [`snapshot`] - whole-tree snapshots for exact round-trip comparisons

pub mod git;
pub mod project;
pub mod snapshot;

pub use project::TestProject;
pub use snapshot::TreeSnapshot;
