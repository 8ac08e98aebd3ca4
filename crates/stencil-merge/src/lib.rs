//! JSON key merging and text patching for stencil.
//!
//! Two independent primitives live here:
//!
//! ## Owned JSON keys
//!
//! A JSON document belongs to the user, but stencil owns a declared set of
//! dot-notation [`KeyPath`]s inside it. [`merge_json_keys`] and
//! [`unmerge_json_keys`] take the output of a (possibly careless) merge
//! function and clip it back so that only declared keys differ from the
//! existing document:
//!
//! ```
//! use serde_json::json;
//! use stencil_merge::{KeyPath, merge_json_keys};
//!
//! let existing = json!({"name": "x"});
//! let keys = vec![KeyPath::parse("scripts.lint").unwrap()];
//! // a merge function that also clobbers "name"
//! let candidate = json!({"name": "oops", "scripts": {"lint": "eslint ."}});
//!
//! let merged = merge_json_keys(&existing, &keys, &candidate).unwrap();
//! assert_eq!(merged, json!({"name": "x", "scripts": {"lint": "eslint ."}}));
//! ```
//!
//! ## Text patches
//!
//! A fixed block of text is prepended or appended to a user file. Presence
//! is detected by a plain substring marker, so re-applying is a no-op.

pub mod error;
pub mod json;
pub mod key_path;
pub mod text;

pub use error::{Error, Result};
pub use json::{
    JsonStyle, created_parents, get_path, is_effectively_empty, merge_json_keys, parse_document,
    prune_empty_objects, remove_path, render_document, set_path, unmerge_json_keys,
};
pub use key_path::KeyPath;
pub use text::{PatchOperation, PatchOutcome, TextPatch, UnpatchOutcome, patch_text, unpatch_text};
