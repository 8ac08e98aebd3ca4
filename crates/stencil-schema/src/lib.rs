//! Declarative schema of everything stencil manages.
//!
//! A [`Schema`] enumerates directories, owned and managed files, JSON merge
//! targets, text patch targets, deprecated artifacts and packages. It is
//! pure data plus small generator functions, assembled with
//! [`SchemaBuilder`] and validated once at [`SchemaBuilder::build`].
//!
//! [`builtin::schema`] is the schema shipped with the `stencil` binary.

pub mod builtin;
pub mod definition;
pub mod error;
pub mod json_merge;
pub mod package;
pub mod predicate;
pub mod schema;
mod validation;

pub use definition::{FileDefinition, FileOutcome, GeneratorError};
pub use error::{Error, Result};
pub use json_merge::JsonMergeDefinition;
pub use package::{Ecosystem, PackageGroup, PackageSet, PackageSpec};
pub use predicate::Predicate;
pub use schema::{DirectoryKind, FileKind, Schema, SchemaBuilder};

/// Text patches are fully described by the merge crate's patch type.
pub type TextPatchDefinition = stencil_merge::TextPatch;
