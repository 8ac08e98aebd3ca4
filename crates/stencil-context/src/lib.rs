//! Project detection for stencil
//!
//! Inspects a project root once per invocation and produces an immutable
//! [`ProjectContext`]: which language ecosystems are present, which linters,
//! formatters and test frameworks are already configured, the aggregated
//! dependency map across workspace packages, and whether the tree is under
//! version control.
//!
//! Malformed manifests never abort detection; they are logged and skipped.

pub mod context;
mod detect;
pub mod error;
mod golang;
mod node;
mod python;
mod rust;
mod tooling;
mod workspace;

pub use context::{
    ExistingTooling, JsPackageManager, Languages, ProjectContext, ProjectContextBuilder,
    PythonInstaller,
};
pub use error::{Error, Result};
