//! How owned and managed file content is produced

use std::sync::Arc;

use stencil_context::ProjectContext;

/// What a generator decided for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Do not create or manage this file for this project.
    Skip,
    /// Desired file content.
    Content(String),
}

impl FileOutcome {
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Skip => None,
            Self::Content(content) => Some(content),
        }
    }
}

/// A generator failed; only the file it was producing is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GeneratorError {
    message: String,
}

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generator signature. Must be deterministic for a fixed context.
pub type GeneratorFn = dyn Fn(&ProjectContext) -> Result<FileOutcome, GeneratorError> + Send + Sync;

/// Source of an owned or managed file's content.
#[derive(Clone)]
pub enum FileDefinition {
    /// A named template embedded in the binary.
    Template {
        name: &'static str,
        body: &'static str,
    },
    /// Fixed content.
    Static(String),
    /// Content computed from the project context.
    Generator(Arc<GeneratorFn>),
}

impl FileDefinition {
    pub fn template(name: &'static str, body: &'static str) -> Self {
        Self::Template { name, body }
    }

    pub fn fixed(content: impl Into<String>) -> Self {
        Self::Static(content.into())
    }

    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&ProjectContext) -> Result<FileOutcome, GeneratorError> + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(f))
    }

    /// Produce the desired content for `ctx`.
    pub fn resolve(&self, ctx: &ProjectContext) -> Result<FileOutcome, GeneratorError> {
        match self {
            Self::Template { body, .. } => Ok(FileOutcome::Content((*body).to_string())),
            Self::Static(content) => Ok(FileOutcome::Content(content.clone())),
            Self::Generator(generate) => generate(ctx),
        }
    }
}

impl std::fmt::Debug for FileDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template { name, .. } => f.debug_struct("Template").field("name", name).finish(),
            Self::Static(content) => f.debug_tuple("Static").field(&content.len()).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}
