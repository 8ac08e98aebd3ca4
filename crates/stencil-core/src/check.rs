//! Read-only drift detection
//!
//! Compares the project against what an install or upgrade would produce,
//! without changing anything.

use serde::Serialize;
use stencil_fs::{RelPath, StencilPath};
use stencil_merge::{get_path, parse_document};
use stencil_schema::FileOutcome;

use crate::cache::ReconcileCache;
use crate::engine::dir_label;
use crate::ledger::Ledger;
use crate::{ReconcileEngine, Result, marker};

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// Everything matches
    Healthy,
    /// Some entries are absent from the project
    Missing,
    /// Some entries differ from what stencil would write
    Drifted,
    /// The ledger or version marker cannot be read
    Broken,
}

/// One entry that is missing or has drifted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftItem {
    pub path: String,
    /// Schema category, e.g. `owned file` or `json merge`
    pub category: String,
    pub description: String,
}

impl DriftItem {
    fn new(path: impl ToString, category: &str, description: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            category: category.to_string(),
            description: description.into(),
        }
    }
}

/// Report from a check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub drifted: Vec<DriftItem>,
    pub missing: Vec<DriftItem>,
    pub messages: Vec<String>,
}

impl CheckReport {
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn broken(message: String) -> Self {
        Self {
            status: CheckStatus::Broken,
            drifted: Vec::new(),
            missing: Vec::new(),
            messages: vec![message],
        }
    }

    /// Build a report from collected items; drift outranks missing entries.
    pub fn from_items(drifted: Vec<DriftItem>, missing: Vec<DriftItem>, messages: Vec<String>) -> Self {
        let status = if !drifted.is_empty() {
            CheckStatus::Drifted
        } else if !missing.is_empty() {
            CheckStatus::Missing
        } else {
            CheckStatus::Healthy
        };
        Self {
            status,
            drifted,
            missing,
            messages,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }

    /// Merge two reports; the result carries the worse status:
    /// Broken > Drifted > Missing > Healthy
    pub fn merge(mut self, other: CheckReport) -> Self {
        self.drifted.extend(other.drifted);
        self.missing.extend(other.missing);
        self.messages.extend(other.messages);

        self.status = match (self.status, other.status) {
            (CheckStatus::Broken, _) | (_, CheckStatus::Broken) => CheckStatus::Broken,
            (CheckStatus::Drifted, _) | (_, CheckStatus::Drifted) => CheckStatus::Drifted,
            (CheckStatus::Missing, _) | (_, CheckStatus::Missing) => CheckStatus::Missing,
            (CheckStatus::Healthy, CheckStatus::Healthy) => CheckStatus::Healthy,
        };
        self
    }
}

impl ReconcileEngine<'_> {
    /// Report every entry that is missing or differs from what stencil
    /// would write. Never touches the project.
    pub fn check(&self, cache: &mut ReconcileCache) -> Result<CheckReport> {
        let root = self.context().root();
        let ledger = match Ledger::load(root) {
            Ok(ledger) => ledger,
            Err(e) => return Ok(CheckReport::broken(e.to_string())),
        };
        let installed = match marker::read(root) {
            Ok(installed) => installed,
            Err(e) => return Ok(CheckReport::broken(e.to_string())),
        };
        let Some(installed) = installed else {
            return Ok(CheckReport::from_items(
                Vec::new(),
                vec![DriftItem::new(
                    StencilPath::VersionMarker.as_str(),
                    "version marker",
                    "stencil is not installed in this project",
                )],
                Vec::new(),
            ));
        };

        let mut checker = Checker {
            engine: self,
            ledger: &ledger,
            drifted: Vec::new(),
            missing: Vec::new(),
            messages: Vec::new(),
        };
        if &installed != self.schema().version() {
            checker.messages.push(format!(
                "installed schema {installed}, this tool provides {}",
                self.schema().version()
            ));
        }
        checker.directories();
        checker.owned_files(cache);
        checker.managed_files(cache);
        checker.json_merges();
        checker.text_patches();
        checker.deprecated();

        tracing::debug!(
            drifted = checker.drifted.len(),
            missing = checker.missing.len(),
            "check finished"
        );
        Ok(CheckReport::from_items(
            checker.drifted,
            checker.missing,
            checker.messages,
        ))
    }
}

struct Checker<'e, 'a> {
    engine: &'e ReconcileEngine<'a>,
    ledger: &'e Ledger,
    drifted: Vec<DriftItem>,
    missing: Vec<DriftItem>,
    messages: Vec<String>,
}

impl Checker<'_, '_> {
    fn read(&mut self, path: &RelPath) -> Option<String> {
        let abs = self.engine.context().root().resolve(path);
        match stencil_fs::io::read_text_opt(&abs) {
            Ok(content) => content,
            Err(e) => {
                self.messages.push(format!("{path}: {e}"));
                None
            }
        }
    }

    fn directories(&mut self) {
        let engine = self.engine;
        let schema = engine.schema();
        for (dir, kind) in schema.directories() {
            if !self.engine.context().root().resolve(dir).is_dir() {
                self.missing.push(DriftItem::new(
                    dir_label(dir),
                    &format!("{} directory", kind.label()),
                    "Directory not found",
                ));
            }
        }
    }

    fn owned_files(&mut self, cache: &mut ReconcileCache) {
        let engine = self.engine;
        let schema = engine.schema();
        for (path, def) in schema.owned_files() {
            let desired = match cache.render(schema.version(), path, def, engine.context()) {
                Ok(FileOutcome::Content(content)) => content,
                Ok(FileOutcome::Skip) => continue,
                Err(e) => {
                    self.messages.push(format!("{path}: generator failed: {e}"));
                    continue;
                }
            };
            match self.read(path) {
                None => self
                    .missing
                    .push(DriftItem::new(path, "owned file", "File not found")),
                Some(current) if current != desired => self.drifted.push(DriftItem::new(
                    path,
                    "owned file",
                    "Content differs from generated output; upgrade will overwrite it",
                )),
                Some(_) => {}
            }
        }
    }

    fn managed_files(&mut self, cache: &mut ReconcileCache) {
        let engine = self.engine;
        let schema = engine.schema();
        for (path, def) in schema.managed_files() {
            let desired = match cache.render(schema.version(), path, def, engine.context()) {
                Ok(FileOutcome::Content(content)) => content,
                Ok(FileOutcome::Skip) => continue,
                Err(e) => {
                    self.messages.push(format!("{path}: generator failed: {e}"));
                    continue;
                }
            };
            let Some(current) = self.read(path) else {
                self.missing
                    .push(DriftItem::new(path, "managed file", "File not found"));
                continue;
            };
            if current == desired {
                continue;
            }
            let description = match self.ledger.file_checksum(path) {
                Some(recorded) if recorded == stencil_fs::compute_content_checksum(&current) => {
                    "Outdated; upgrade will update it"
                }
                Some(_) => "Customized since stencil last wrote it; upgrade will keep it",
                None => "Not written by stencil; upgrade will keep it",
            };
            self.drifted
                .push(DriftItem::new(path, "managed file", description));
        }
    }

    fn json_merges(&mut self) {
        let engine = self.engine;
        let schema = engine.schema();
        let ctx = engine.context();
        for (path, def) in schema.json_merges() {
            let Some(text) = self.read(path) else {
                if !def.skips_if_missing() {
                    self.missing
                        .push(DriftItem::new(path, "json merge", "File not found"));
                }
                continue;
            };
            let doc = match parse_document(&text) {
                Ok(doc) => doc,
                Err(e) => {
                    self.drifted
                        .push(DriftItem::new(path, "json merge", format!("Invalid JSON: {e}")));
                    continue;
                }
            };
            let Ok(expected) = def.apply_merge(&doc, ctx) else {
                continue;
            };
            for key in def.active_keys(ctx) {
                match (get_path(&doc, &key), get_path(&expected, &key)) {
                    (None, _) => self.missing.push(DriftItem::new(
                        path,
                        "json merge",
                        format!("Key {key} not found"),
                    )),
                    (Some(actual), Some(wanted)) if actual != wanted => {
                        self.drifted.push(DriftItem::new(
                            path,
                            "json merge",
                            format!("Value mismatch at {key}: expected {wanted}, got {actual}"),
                        ));
                    }
                    _ => {}
                }
            }
        }
    }

    fn text_patches(&mut self) {
        let engine = self.engine;
        let schema = engine.schema();
        for (path, patch) in schema.text_patches() {
            match self.read(path) {
                None if patch.create_if_missing => self
                    .missing
                    .push(DriftItem::new(path, "text patch", "File not found")),
                None => {}
                Some(text) if !patch.is_applied(&text) => self.missing.push(DriftItem::new(
                    path,
                    "text patch",
                    format!("Marker '{}' not found", patch.marker),
                )),
                Some(_) => {}
            }
        }
    }

    fn deprecated(&mut self) {
        let engine = self.engine;
        let schema = engine.schema();
        let root = engine.context().root();
        for path in schema.deprecated_files() {
            if root.resolve(path).exists() {
                self.drifted.push(DriftItem::new(
                    path,
                    "deprecated file",
                    "Deprecated; upgrade will remove it",
                ));
            }
        }
        for dir in schema.deprecated_directories() {
            if root.resolve(dir).is_dir() {
                self.drifted.push(DriftItem::new(
                    dir_label(dir),
                    "deprecated directory",
                    "Deprecated; upgrade will remove it",
                ));
            }
        }
    }
}
