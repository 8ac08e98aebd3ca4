//! Error types for stencil-merge

/// Result type for stencil-merge operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed JSON: {message}")]
    Malformed { message: String },

    #[error("Expected a JSON object at '{path}'")]
    NotAnObject { path: String },

    #[error("Cannot set '{path}': '{segment}' holds a non-object value")]
    PathConflict { path: String, segment: String },

    #[error("Invalid key path '{input}': {reason}")]
    InvalidKeyPath { input: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
