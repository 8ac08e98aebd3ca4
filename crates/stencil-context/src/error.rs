//! Error types for stencil-context

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Only an unusable root is fatal; everything else degrades to "not detected".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Project root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Project root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("Project root is unreadable at {path}: {message}")]
    RootUnreadable { path: PathBuf, message: String },
}
