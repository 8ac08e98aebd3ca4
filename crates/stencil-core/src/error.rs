//! Error types for stencil-core
//!
//! Only failures that must stop a pass before it mutates anything live
//! here. Per-entry problems are collected in the
//! [`ReconcileReport`](crate::ReconcileReport) instead.

use std::path::PathBuf;

/// Result type for stencil-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ledger exists but cannot be read or parsed
    #[error("Ledger at {path} is unreadable: {message}")]
    Ledger { path: PathBuf, message: String },

    /// The version marker holds something other than a semantic version
    #[error("Version marker at {path} is invalid: '{content}'")]
    InvalidMarker { path: PathBuf, content: String },

    /// The project was set up by a newer schema than this one
    #[error(
        "Project was set up with schema {installed}, newer than this tool's {available}; pass --force to downgrade"
    )]
    Downgrade {
        installed: semver::Version,
        available: semver::Version,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from stencil-fs
    #[error(transparent)]
    Fs(#[from] stencil_fs::Error),

    /// Project detection error from stencil-context
    #[error(transparent)]
    Context(#[from] stencil_context::Error),

    /// Schema validation error from stencil-schema
    #[error(transparent)]
    Schema(#[from] stencil_schema::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
