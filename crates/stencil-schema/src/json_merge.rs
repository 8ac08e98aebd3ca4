//! Owned keys inside user JSON documents

use std::sync::Arc;

use serde_json::Value;
use stencil_context::ProjectContext;
use stencil_merge::{KeyPath, get_path, merge_json_keys, remove_path, set_path, unmerge_json_keys};

use crate::Predicate;

/// Merge and unmerge transform signature.
pub type JsonTransform = dyn Fn(&Value, &ProjectContext) -> Value + Send + Sync;

/// The keys stencil owns inside an otherwise user-owned JSON document.
///
/// The `merge`/`unmerge` functions may be arbitrary, but their output is
/// always clipped to the declared key set: unconditional keys plus every
/// conditional key regardless of whether its predicate holds. Nothing
/// outside that set is ever introduced, changed, or removed.
#[derive(Clone)]
pub struct JsonMergeDefinition {
    keys: Vec<KeyPath>,
    conditional_keys: Vec<(Predicate, KeyPath)>,
    merge: Arc<JsonTransform>,
    unmerge: Arc<JsonTransform>,
    remove_file_if_empty: bool,
    skip_if_missing: bool,
}

impl JsonMergeDefinition {
    /// A merge with custom transforms over the given owned keys.
    pub fn new<M, U>(keys: Vec<KeyPath>, merge: M, unmerge: U) -> Self
    where
        M: Fn(&Value, &ProjectContext) -> Value + Send + Sync + 'static,
        U: Fn(&Value, &ProjectContext) -> Value + Send + Sync + 'static,
    {
        Self {
            keys,
            conditional_keys: Vec::new(),
            merge: Arc::new(merge),
            unmerge: Arc::new(unmerge),
            remove_file_if_empty: false,
            skip_if_missing: false,
        }
    }

    /// A merge that sets fixed values and removes them again on unmerge.
    ///
    /// Conditional entries are set while their predicate holds and removed
    /// when it stops holding.
    pub fn entries(
        entries: Vec<(KeyPath, Value)>,
        conditional: Vec<(Predicate, KeyPath, Value)>,
    ) -> Self {
        let keys: Vec<KeyPath> = entries.iter().map(|(k, _)| k.clone()).collect();
        let conditional_keys: Vec<(Predicate, KeyPath)> = conditional
            .iter()
            .map(|(p, k, _)| (p.clone(), k.clone()))
            .collect();
        let entries = Arc::new(entries);
        let conditional = Arc::new(conditional);

        let merge = {
            let entries = Arc::clone(&entries);
            let conditional = Arc::clone(&conditional);
            move |existing: &Value, ctx: &ProjectContext| {
                let mut doc = existing.clone();
                for (key, value) in entries.iter() {
                    if set_path(&mut doc, key, value.clone()).is_err() {
                        tracing::debug!(key = %key, "owned key blocked by a non-object parent");
                    }
                }
                for (predicate, key, value) in conditional.iter() {
                    if predicate.evaluate(ctx) {
                        if set_path(&mut doc, key, value.clone()).is_err() {
                            tracing::debug!(key = %key, "owned key blocked by a non-object parent");
                        }
                    } else {
                        remove_path(&mut doc, key);
                    }
                }
                doc
            }
        };

        let all_keys: Vec<KeyPath> = keys
            .iter()
            .chain(conditional_keys.iter().map(|(_, k)| k))
            .cloned()
            .collect();
        let unmerge = move |existing: &Value, _: &ProjectContext| {
            let mut doc = existing.clone();
            for key in &all_keys {
                remove_path(&mut doc, key);
            }
            doc
        };

        Self {
            keys,
            conditional_keys,
            merge: Arc::new(merge),
            unmerge: Arc::new(unmerge),
            remove_file_if_empty: false,
            skip_if_missing: false,
        }
    }

    /// Declare a key owned only while `predicate` holds.
    pub fn conditional_key(mut self, predicate: Predicate, key: KeyPath) -> Self {
        self.conditional_keys.push((predicate, key));
        self
    }

    /// Delete the file on unmerge when nothing meaningful remains.
    pub fn remove_file_if_empty(mut self, remove: bool) -> Self {
        self.remove_file_if_empty = remove;
        self
    }

    /// Never create the file; only merge into it when it already exists.
    pub fn skip_if_missing(mut self, skip: bool) -> Self {
        self.skip_if_missing = skip;
        self
    }

    pub fn keys(&self) -> &[KeyPath] {
        &self.keys
    }

    pub fn conditional_keys(&self) -> &[(Predicate, KeyPath)] {
        &self.conditional_keys
    }

    pub fn removes_file_if_empty(&self) -> bool {
        self.remove_file_if_empty
    }

    pub fn skips_if_missing(&self) -> bool {
        self.skip_if_missing
    }

    /// Every key the merge may touch, conditional or not.
    pub fn declared_keys(&self) -> Vec<KeyPath> {
        self.keys
            .iter()
            .chain(self.conditional_keys.iter().map(|(_, k)| k))
            .cloned()
            .collect()
    }

    /// Keys that should be present for `ctx` after a merge.
    pub fn active_keys(&self, ctx: &ProjectContext) -> Vec<KeyPath> {
        self.keys
            .iter()
            .cloned()
            .chain(
                self.conditional_keys
                    .iter()
                    .filter(|(p, _)| p.evaluate(ctx))
                    .map(|(_, k)| k.clone()),
            )
            .collect()
    }

    /// Run `merge` and clip its output to the declared keys.
    pub fn apply_merge(&self, existing: &Value, ctx: &ProjectContext) -> stencil_merge::Result<Value> {
        let candidate = (self.merge)(existing, ctx);
        merge_json_keys(existing, &self.declared_keys(), &candidate)
    }

    /// Run `unmerge` and clip its output to the declared keys.
    pub fn apply_unmerge(&self, existing: &Value, ctx: &ProjectContext) -> stencil_merge::Result<Value> {
        let candidate = (self.unmerge)(existing, ctx);
        unmerge_json_keys(existing, &self.declared_keys(), &candidate)
    }

    /// Active keys missing from `doc`, e.g. because a user value blocks them.
    pub fn missing_keys(&self, doc: &Value, ctx: &ProjectContext) -> Vec<KeyPath> {
        self.active_keys(ctx)
            .into_iter()
            .filter(|key| get_path(doc, key).is_none())
            .collect()
    }
}

impl std::fmt::Debug for JsonMergeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonMergeDefinition")
            .field("keys", &self.keys)
            .field("conditional_keys", &self.conditional_keys)
            .field("remove_file_if_empty", &self.remove_file_if_empty)
            .field("skip_if_missing", &self.skip_if_missing)
            .finish_non_exhaustive()
    }
}
