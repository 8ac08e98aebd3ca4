//! Error types for stencil-schema
//!
//! Every variant describes a schema authoring mistake. They surface when a
//! schema is built, before anything touches a project.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid path in schema: {0}")]
    InvalidPath(#[from] stencil_fs::Error),

    #[error("Invalid schema version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    #[error("'{path}' is declared as both {first} and {second}")]
    DuplicatePath {
        path: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("'{path}' is declared as {category} and also deprecated")]
    DeprecatedConflict {
        path: String,
        category: &'static str,
    },

    #[error("Directory '{path}' is declared as both {first} and {second}")]
    DirectoryConflict {
        path: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid key path in merge for '{path}': {source}")]
    InvalidKeyPath {
        path: String,
        #[source]
        source: stencil_merge::Error,
    },

    #[error("Merge for '{path}' declares overlapping keys '{first}' and '{second}'")]
    OverlappingKeys {
        path: String,
        first: String,
        second: String,
    },

    #[error("Text patch for '{path}' does not contain its own marker '{marker}'")]
    MarkerNotInContent { path: String, marker: String },

    #[error("Unknown predicate '{name}'")]
    UnknownPredicate { name: String },
}
