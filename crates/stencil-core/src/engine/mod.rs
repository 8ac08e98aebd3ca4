//! The reconciliation engine
//!
//! Each operation visits the schema categories in a fixed order:
//! directories before files, files before merges, and on upgrade the
//! deprecation cleanup before anything is regenerated, since a deprecated
//! path may be reused by a new entry. Every entry is an independent unit
//! of work; failures are collected in the report and the pass moves on.

mod directories;
mod files;
mod merges;
mod packages;
mod patches;

use std::collections::BTreeSet;

use semver::Version;
use stencil_context::ProjectContext;
use stencil_fs::{NormalizedPath, RelPath, StencilPath};
use stencil_schema::{FileDefinition, FileOutcome, Schema};

use crate::cache::ReconcileCache;
use crate::ledger::Ledger;
use crate::packages::PackageManager;
use crate::report::{ChangeAction, PlannedChange, ReconcileReport};
use crate::{Error, Operation, ReconcileOptions, Result, marker};

/// Applies a [`Schema`] to the project described by a [`ProjectContext`].
///
/// ```no_run
/// use stencil_core::{Operation, ReconcileCache, ReconcileEngine};
/// use stencil_context::ProjectContext;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = ProjectContext::detect(".")?;
/// let schema = stencil_schema::builtin::schema()?;
/// let mut cache = ReconcileCache::new();
///
/// let report = ReconcileEngine::new(&schema, &ctx).reconcile(Operation::Install, &mut cache)?;
/// assert!(report.is_success());
/// # Ok(())
/// # }
/// ```
pub struct ReconcileEngine<'a> {
    schema: &'a Schema,
    context: &'a ProjectContext,
    packages: Option<&'a dyn PackageManager>,
    options: ReconcileOptions,
}

impl<'a> ReconcileEngine<'a> {
    /// An engine that leaves packages alone until a manager is supplied.
    pub fn new(schema: &'a Schema, context: &'a ProjectContext) -> Self {
        Self {
            schema,
            context,
            packages: None,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_package_manager(mut self, packages: &'a dyn PackageManager) -> Self {
        self.packages = Some(packages);
        self
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn context(&self) -> &ProjectContext {
        self.context
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Run one lifecycle operation.
    ///
    /// Per-entry failures land in [`ReconcileReport::errors`]; only problems
    /// that must stop the pass before it touches anything are returned as
    /// errors.
    ///
    /// # Errors
    ///
    /// - [`Error::Ledger`] if the ledger exists but cannot be parsed
    /// - [`Error::Downgrade`] if upgrading a project set up by a newer
    ///   schema without `force`
    pub fn reconcile(&self, operation: Operation, cache: &mut ReconcileCache) -> Result<ReconcileReport> {
        let ledger = Ledger::load(self.context.root())?;
        let mut pass = Pass::new(self, operation, ledger)?;
        let installed = pass.installed_version();

        tracing::info!(
            %operation,
            root = %pass.root,
            schema = %self.schema.version(),
            installed = ?installed,
            dry_run = self.options.dry_run,
            "reconciling"
        );

        match operation {
            Operation::Install => install(&mut pass, cache, installed.as_ref()),
            Operation::Upgrade => match installed {
                None => {
                    tracing::info!("no previous install found; upgrading as a fresh install");
                    install(&mut pass, cache, None);
                }
                Some(ref version) if version > self.schema.version() && !self.options.force => {
                    return Err(Error::Downgrade {
                        installed: version.clone(),
                        available: self.schema.version().clone(),
                    });
                }
                Some(ref version) => upgrade(&mut pass, cache, version),
            },
            Operation::Uninstall => uninstall(&mut pass),
        }

        Ok(pass.report)
    }
}

fn install(pass: &mut Pass<'_>, cache: &mut ReconcileCache, installed: Option<&Version>) {
    directories::create_all(pass);
    files::write_owned(pass, cache);
    files::install_managed(pass, cache);
    merges::merge_all(pass);
    patches::patch_all(pass);
    packages::install_required(pass, cache);
    pass.commit(installed);
}

fn upgrade(pass: &mut Pass<'_>, cache: &mut ReconcileCache, installed: &Version) {
    directories::create_all(pass);
    files::remove_deprecated(pass);
    directories::remove_deprecated(pass);
    files::write_owned(pass, cache);
    files::upgrade_managed(pass, cache);
    merges::merge_all(pass);
    patches::patch_all(pass);
    packages::install_required(pass, cache);
    packages::uninstall_deprecated(pass);
    pass.commit(Some(installed));
}

fn uninstall(pass: &mut Pass<'_>) {
    merges::unmerge_all(pass);
    patches::unpatch_all(pass);
    directories::remove_owned(pass);
    files::remove_all(pass);
    packages::uninstall_recorded(pass);
    pass.clear_state();
    directories::prune_created(pass);
}

/// What reading a file found.
pub(crate) enum Existing {
    Absent,
    Present(String),
    /// Reading failed; the error is already in the report
    Unreadable,
}

/// Mutable state of one reconciliation pass.
pub(crate) struct Pass<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) ctx: &'a ProjectContext,
    pub(crate) packages: Option<&'a dyn PackageManager>,
    pub(crate) options: &'a ReconcileOptions,
    pub(crate) root: NormalizedPath,
    pub(crate) report: ReconcileReport,
    pub(crate) ledger: Ledger,
    loaded: Ledger,
    state_dir: RelPath,
    marker_path: RelPath,
    ledger_path: RelPath,
    /// Directories whose creation failed
    blocked: BTreeSet<RelPath>,
    /// Dry runs only: directories that would have been created
    planned_dirs: BTreeSet<RelPath>,
    /// Dry runs only: paths that would have been removed
    planned_removals: BTreeSet<RelPath>,
}

impl<'a> Pass<'a> {
    fn new(engine: &'a ReconcileEngine<'_>, operation: Operation, ledger: Ledger) -> Result<Self> {
        Ok(Self {
            schema: engine.schema,
            ctx: engine.context,
            packages: engine.packages,
            options: &engine.options,
            root: engine.context.root().clone(),
            report: ReconcileReport::new(operation, engine.options.dry_run),
            loaded: ledger.clone(),
            ledger,
            state_dir: RelPath::parse(StencilPath::StateDir.as_str())?,
            marker_path: RelPath::parse(StencilPath::VersionMarker.as_str())?,
            ledger_path: RelPath::parse(StencilPath::Ledger.as_str())?,
            blocked: BTreeSet::new(),
            planned_dirs: BTreeSet::new(),
            planned_removals: BTreeSet::new(),
        })
    }

    pub(crate) fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub(crate) fn abs(&self, path: &RelPath) -> NormalizedPath {
        self.root.resolve(path)
    }

    /// The marker's version. An unreadable marker is reported and treated
    /// as no install at all.
    fn installed_version(&mut self) -> Option<Version> {
        match marker::read(&self.root) {
            Ok(version) => version,
            Err(e) => {
                self.report.warn(StencilPath::VersionMarker.as_str(), e);
                None
            }
        }
    }

    fn removal_planned(&self, path: &RelPath) -> bool {
        self.planned_removals.iter().any(|r| path.is_within(r))
    }

    pub(crate) fn exists(&self, path: &RelPath) -> bool {
        !self.removal_planned(path) && (self.planned_dirs.contains(path) || self.abs(path).exists())
    }

    pub(crate) fn is_dir(&self, path: &RelPath) -> bool {
        !self.removal_planned(path) && (self.planned_dirs.contains(path) || self.abs(path).is_dir())
    }

    pub(crate) fn read(&mut self, path: &RelPath) -> Existing {
        if self.removal_planned(path) {
            return Existing::Absent;
        }
        match stencil_fs::io::read_text_opt(&self.abs(path)) {
            Ok(Some(content)) => Existing::Present(content),
            Ok(None) => Existing::Absent,
            Err(e) => {
                self.report.error(path, e);
                Existing::Unreadable
            }
        }
    }

    /// Resolve a file definition through the cache. `None` on skip or on a
    /// generator failure, which is reported.
    pub(crate) fn render(
        &mut self,
        cache: &mut ReconcileCache,
        path: &RelPath,
        def: &FileDefinition,
    ) -> Option<String> {
        match cache.render(self.schema.version(), path, def, self.ctx) {
            Ok(FileOutcome::Content(content)) => Some(content),
            Ok(FileOutcome::Skip) => {
                tracing::debug!(path = %path, "generator skipped file");
                None
            }
            Err(e) => {
                self.report.error(path, format!("generator failed: {e}"));
                None
            }
        }
    }

    /// Create `dir` and any missing ancestors one level at a time.
    ///
    /// Levels that did not exist are recorded as created. A level that
    /// cannot be created is reported and blocks everything beneath it.
    pub(crate) fn ensure_dir(&mut self, dir: &RelPath) -> bool {
        let mut levels = dir.ancestors();
        levels.push(dir.clone());

        for level in &levels {
            if self.blocked.contains(level) {
                return false;
            }
            if self.is_dir(level) {
                continue;
            }
            if self.exists(level) {
                self.report.error(dir_label(level), "exists and is not a directory");
                self.blocked.insert(level.clone());
                return false;
            }
            if self.dry_run() {
                self.planned_dirs.insert(level.clone());
                self.plan(dir_label(level), ChangeAction::CreateDir, None, None);
                self.report.created.push(dir_label(level));
                continue;
            }
            match stencil_fs::io::create_dir(&self.abs(level)) {
                Ok(true) => {
                    tracing::debug!(path = %level, "created directory");
                    self.ledger.record_created_directory(level);
                    self.report.created.push(dir_label(level));
                }
                Ok(false) => {}
                Err(e) => {
                    self.report.error(dir_label(level), e);
                    self.blocked.insert(level.clone());
                    return false;
                }
            }
        }
        true
    }

    fn ensure_parent(&mut self, path: &RelPath) -> bool {
        let Some(parent) = path.parent() else {
            return true;
        };
        if self.ensure_dir(&parent) {
            return true;
        }
        self.report
            .error(path, format!("parent directory {} is unavailable", dir_label(&parent)));
        false
    }

    /// Write `content`, creating parents as needed. `before` is the current
    /// content, `None` when the file is new.
    pub(crate) fn write(&mut self, path: &RelPath, before: Option<&str>, content: &str) -> bool {
        if !self.ensure_parent(path) {
            return false;
        }
        if self.dry_run() {
            let action = if before.is_some() {
                ChangeAction::Update
            } else {
                ChangeAction::Create
            };
            self.plan(
                path.to_string(),
                action,
                before.map(str::to_string),
                Some(content.to_string()),
            );
            return true;
        }
        match stencil_fs::io::write_text(&self.abs(path), content) {
            Ok(()) => {
                tracing::debug!(path = %path, "wrote file");
                true
            }
            Err(e) => {
                self.report.error(path, e);
                false
            }
        }
    }

    pub(crate) fn delete(&mut self, path: &RelPath, before: Option<&str>) -> bool {
        if self.dry_run() {
            self.planned_removals.insert(path.clone());
            self.plan(path.to_string(), ChangeAction::Delete, before.map(str::to_string), None);
            return true;
        }
        match stencil_fs::io::remove_file(&self.abs(path)) {
            Ok(_) => {
                tracing::debug!(path = %path, "deleted file");
                true
            }
            Err(e) => {
                self.report.error(path, e);
                false
            }
        }
    }

    pub(crate) fn delete_tree(&mut self, dir: &RelPath) -> bool {
        if self.dry_run() {
            self.planned_removals.insert(dir.clone());
            self.plan(dir_label(dir), ChangeAction::DeleteDir, None, None);
            return true;
        }
        match stencil_fs::io::remove_dir_all(&self.abs(dir)) {
            Ok(_) => {
                tracing::debug!(path = %dir, "deleted directory tree");
                true
            }
            Err(e) => {
                self.report.error(dir_label(dir), e);
                false
            }
        }
    }

    /// Remove `dir` if nothing is left in it. Returns whether it went away.
    pub(crate) fn delete_dir_if_empty(&mut self, dir: &RelPath) -> bool {
        if self.dry_run() {
            if !self.would_be_empty(dir) {
                return false;
            }
            self.planned_removals.insert(dir.clone());
            self.plan(dir_label(dir), ChangeAction::DeleteDir, None, None);
            return true;
        }
        match stencil_fs::io::remove_dir_if_empty(&self.abs(dir)) {
            Ok(removed) => removed,
            Err(e) => {
                self.report.error(dir_label(dir), e);
                false
            }
        }
    }

    fn would_be_empty(&self, dir: &RelPath) -> bool {
        let Ok(entries) = std::fs::read_dir(self.abs(dir).to_native()) else {
            return false;
        };
        entries.flatten().all(|entry| {
            let name = entry.file_name();
            RelPath::parse(&format!("{}/{}", dir, name.to_string_lossy()))
                .map(|child| self.removal_planned(&child))
                .unwrap_or(false)
        })
    }

    /// Write `desired` unless the file already holds it, then record its
    /// checksum as last written by stencil.
    pub(crate) fn converge_file(&mut self, path: &RelPath, current: Option<&str>, desired: &str) {
        match current {
            Some(existing) if existing == desired => {
                self.report.unchanged.push(path.to_string());
            }
            Some(existing) => {
                if !self.write(path, Some(existing), desired) {
                    return;
                }
                self.report.updated.push(path.to_string());
            }
            None => {
                if !self.write(path, None, desired) {
                    return;
                }
                self.ledger.record_created_file(path);
                self.report.created.push(path.to_string());
            }
        }
        self.ledger
            .record_file(path, stencil_fs::compute_content_checksum(desired));
    }

    fn plan(&mut self, path: String, action: ChangeAction, before: Option<String>, after: Option<String>) {
        self.report.planned.push(PlannedChange {
            path,
            action,
            before,
            after,
        });
    }

    /// Finish an install or upgrade: stamp the marker when every entry
    /// succeeded, then persist the ledger if it changed.
    fn commit(&mut self, installed: Option<&Version>) {
        if self.report.is_success() && installed != Some(self.schema.version()) {
            let before = installed.map(marker::content);
            let after = marker::content(self.schema.version());
            let marker_path = self.marker_path.clone();
            if self.write(&marker_path, before.as_deref(), &after) {
                tracing::info!(version = %self.schema.version(), "version marker updated");
            }
        } else if !self.report.is_success() {
            tracing::warn!(
                errors = self.report.errors.len(),
                "pass had errors; version marker left as it was"
            );
        }
        self.save_ledger();
    }

    fn save_ledger(&mut self) {
        if self.dry_run() || self.ledger == self.loaded {
            return;
        }
        let state_dir = self.state_dir.clone();
        if !self.ensure_dir(&state_dir) {
            return;
        }
        self.ledger.touch();
        if let Err(e) = self.ledger.save(&self.root) {
            let path = self.ledger_path.clone();
            self.report.error(&path, e);
        }
    }

    /// Drop the marker and ledger after a clean uninstall. When anything
    /// failed the remaining records are kept so a retry can finish the job.
    fn clear_state(&mut self) {
        if !self.report.is_success() || !self.report.packages.errors.is_empty() {
            tracing::warn!("uninstall incomplete; keeping the ledger for a retry");
            self.save_ledger();
            return;
        }
        for path in [self.marker_path.clone(), self.ledger_path.clone()] {
            if let Existing::Present(content) = self.read(&path) {
                self.delete(&path, Some(content.as_str()));
            }
        }
        let state_dir = self.state_dir.clone();
        if self.is_dir(&state_dir) && self.delete_dir_if_empty(&state_dir) {
            self.ledger.forget_directory(&state_dir);
            self.report.deleted.push(dir_label(&state_dir));
        }
    }
}

/// Report label for a directory.
pub(crate) fn dir_label(dir: &RelPath) -> String {
    format!("{dir}/")
}
