//! Per-invocation memo owned by the caller

use std::collections::{HashMap, HashSet};

use semver::Version;
use stencil_fs::RelPath;
use stencil_schema::{FileDefinition, FileOutcome, GeneratorError};
use stencil_context::ProjectContext;

/// Memoizes generator output and package attempts for one invocation.
///
/// Output is keyed by schema version and path, so one cache can serve
/// passes over different schemas. Create one per project context; reusing
/// a cache across contexts returns output rendered for the first one.
#[derive(Debug, Default)]
pub struct ReconcileCache {
    rendered: HashMap<(Version, RelPath), Result<FileOutcome, GeneratorError>>,
    attempted_packages: HashSet<String>,
}

impl ReconcileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `def` for `path` under the schema `version`, at most once
    /// per cache.
    pub fn render(
        &mut self,
        version: &Version,
        path: &RelPath,
        def: &FileDefinition,
        ctx: &ProjectContext,
    ) -> Result<FileOutcome, GeneratorError> {
        self.rendered
            .entry((version.clone(), path.clone()))
            .or_insert_with(|| def.resolve(ctx))
            .clone()
    }

    /// Record a package group attempt; `false` if it was already attempted.
    pub fn begin_package_group(&mut self, key: &str) -> bool {
        self.attempted_packages.insert(key.to_string())
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
        self.attempted_packages.clear();
    }
}
