//! The project a command operates on
//!
//! Detection and schema loading are the only fatal steps before the engine
//! runs; both happen here, once per invocation.

use std::path::Path;

use stencil_context::ProjectContext;
use stencil_core::{ReconcileEngine, ReconcileOptions, SystemPackageManager};
use stencil_schema::{Schema, builtin};

use crate::cli::PackageArgs;
use crate::error::Result;

pub struct Project {
    pub context: ProjectContext,
    pub schema: Schema,
}

impl Project {
    /// Detect the project at `path` and load the built-in schema.
    pub fn open(path: &Path) -> Result<Self> {
        let context = ProjectContext::detect(path)?;
        let schema = builtin::schema()?;
        tracing::debug!(
            root = %context.root(),
            schema = %schema.version(),
            "project opened"
        );
        Ok(Self { context, schema })
    }

    pub fn engine(&self) -> ReconcileEngine<'_> {
        ReconcileEngine::new(&self.schema, &self.context)
    }

    /// Package manager for the mutating commands.
    pub fn package_manager(&self, args: &PackageArgs) -> SystemPackageManager {
        SystemPackageManager::for_project(&self.context, args.timeout())
    }
}

/// Engine options from the shared flags.
pub fn options(dry_run: bool, force: bool, args: &PackageArgs) -> ReconcileOptions {
    ReconcileOptions {
        dry_run,
        force,
        skip_packages: args.skip_packages,
        package_timeout: args.timeout(),
    }
}
