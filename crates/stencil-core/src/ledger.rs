//! Install ledger
//!
//! Records what stencil itself put into a project: the checksum of every
//! owned and managed file as last written, the directories and files that
//! did not exist before stencil created them, what a JSON merge or text
//! patch changed around its own content, and the packages it installed.
//! Upgrade uses the checksums to tell untouched managed files from
//! customized ones; uninstall uses the rest to undo exactly what was done
//! and nothing more.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use stencil_fs::{NormalizedPath, RelPath, StencilPath};
use stencil_schema::Ecosystem;

use crate::{Error, Result};

const FORMAT_VERSION: &str = "1";

/// Checksum of a file as stencil last wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub checksum: String,
}

/// What stencil changed in a user JSON document besides its owned keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRecord {
    /// The document as it was before the first merge touched it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Parent objects the merge created, as key paths
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub created_parents: BTreeSet<String>,
}

/// A package stencil installed that the project did not already depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub ecosystem: Ecosystem,
    pub name: String,
    #[serde(default)]
    pub dev: bool,
}

/// Persistent record of stencil's own changes to a project.
///
/// Scalars and arrays come before tables so the TOML stays flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Ledger format version for forward compatibility
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_directories: BTreeSet<RelPath>,
    #[serde(default)]
    created_files: BTreeSet<RelPath>,
    /// Text files an append had to give a final newline
    #[serde(default)]
    patch_separators: BTreeSet<RelPath>,
    #[serde(default)]
    files: BTreeMap<RelPath, FileRecord>,
    #[serde(default)]
    json: BTreeMap<RelPath, JsonRecord>,
    #[serde(default)]
    packages: Vec<InstalledPackage>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            updated_at: None,
            created_directories: BTreeSet::new(),
            created_files: BTreeSet::new(),
            patch_separators: BTreeSet::new(),
            files: BTreeMap::new(),
            json: BTreeMap::new(),
            packages: Vec::new(),
        }
    }

    pub fn path(root: &NormalizedPath) -> NormalizedPath {
        root.join(StencilPath::Ledger.as_str())
    }

    /// Load the ledger under `root` with a shared lock, or an empty one if
    /// there is none yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ledger`] if the file exists but cannot be read,
    /// locked, or parsed.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = Self::path(root);
        let native = path.to_native();
        let fail = |message: String| Error::Ledger {
            path: native.clone(),
            message,
        };

        let file = match File::open(&native) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(fail(e.to_string())),
        };
        FileExt::lock_shared(&file).map_err(|e| fail(e.to_string()))?;

        // Read through the locked handle
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| fail(e.to_string()))?;
        toml::from_str(&content).map_err(|e| fail(e.to_string()))
    }

    /// Save the ledger under `root` atomically.
    ///
    /// The state directory must already exist.
    pub fn save(&self, root: &NormalizedPath) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        stencil_fs::io::write_text(&Self::path(root), &content)?;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.created_directories.is_empty()
            && self.created_files.is_empty()
            && self.patch_separators.is_empty()
            && self.files.is_empty()
            && self.json.is_empty()
            && self.packages.is_empty()
    }

    pub fn record_file(&mut self, path: &RelPath, checksum: String) {
        self.files.insert(path.clone(), FileRecord { checksum });
    }

    pub fn file_checksum(&self, path: &RelPath) -> Option<&str> {
        self.files.get(path).map(|r| r.checksum.as_str())
    }

    pub fn files(&self) -> &BTreeMap<RelPath, FileRecord> {
        &self.files
    }

    pub fn record_created_file(&mut self, path: &RelPath) {
        self.created_files.insert(path.clone());
    }

    pub fn created_file(&self, path: &RelPath) -> bool {
        self.created_files.contains(path)
    }

    pub fn record_created_directory(&mut self, path: &RelPath) {
        self.created_directories.insert(path.clone());
    }

    pub fn created_directories(&self) -> &BTreeSet<RelPath> {
        &self.created_directories
    }

    pub fn record_patch_separator(&mut self, path: &RelPath) {
        self.patch_separators.insert(path.clone());
    }

    pub fn patch_separator(&self, path: &RelPath) -> bool {
        self.patch_separators.contains(path)
    }

    /// Remember a JSON document's text before stencil first changed it.
    /// Later merges keep the first recording.
    pub fn record_json_original(&mut self, path: &RelPath, text: &str) {
        let record = self.json.entry(path.clone()).or_default();
        if record.original.is_none() {
            record.original = Some(text.to_string());
        }
    }

    pub fn record_json_parents<I>(&mut self, path: &RelPath, parents: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut parents = parents.into_iter().peekable();
        if parents.peek().is_none() {
            return;
        }
        self.json
            .entry(path.clone())
            .or_default()
            .created_parents
            .extend(parents);
    }

    pub fn json_record(&self, path: &RelPath) -> Option<&JsonRecord> {
        self.json.get(path)
    }

    /// Drop every record of `path`, after stencil deleted it or took its
    /// own changes back out.
    pub fn forget_file(&mut self, path: &RelPath) {
        self.files.remove(path);
        self.created_files.remove(path);
        self.patch_separators.remove(path);
        self.json.remove(path);
    }

    /// Drop every record at or below `dir`.
    pub fn forget_tree(&mut self, dir: &RelPath) {
        self.files.retain(|p, _| !p.is_within(dir));
        self.created_files.retain(|p| !p.is_within(dir));
        self.patch_separators.retain(|p| !p.is_within(dir));
        self.json.retain(|p, _| !p.is_within(dir));
        self.created_directories.retain(|p| !p.is_within(dir));
    }

    pub fn forget_directory(&mut self, dir: &RelPath) {
        self.created_directories.remove(dir);
    }

    pub fn record_package(&mut self, package: InstalledPackage) {
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
    }

    pub fn packages(&self) -> &[InstalledPackage] {
        &self.packages
    }

    pub fn has_package(&self, ecosystem: Ecosystem, name: &str) -> bool {
        self.packages
            .iter()
            .any(|p| p.ecosystem == ecosystem && p.name == name)
    }

    pub fn forget_package(&mut self, ecosystem: Ecosystem, name: &str) {
        self.packages
            .retain(|p| !(p.ecosystem == ecosystem && p.name == name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn rel(s: &str) -> RelPath {
        RelPath::parse(s).unwrap()
    }

    #[test]
    fn missing_ledger_loads_empty() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::load(&NormalizedPath::new(dir.path())).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".stencil")).unwrap();
        let root = NormalizedPath::new(dir.path());

        let mut ledger = Ledger::new();
        ledger.record_file(&rel("AGENTS.md"), "sha256:abc".to_string());
        ledger.record_created_file(&rel("AGENTS.md"));
        ledger.record_created_directory(&rel("docs/decisions"));
        ledger.record_patch_separator(&rel(".gitignore"));
        ledger.record_json_original(&rel("package.json"), "{\"name\":\"x\"}\n");
        ledger.record_json_parents(&rel("package.json"), ["scripts".to_string()]);
        ledger.record_package(InstalledPackage {
            ecosystem: Ecosystem::Javascript,
            name: "eslint".to_string(),
            dev: true,
        });
        ledger.touch();
        ledger.save(&root).unwrap();

        let loaded = Ledger::load(&root).unwrap();
        assert_eq!(loaded, ledger);

        let raw = std::fs::read_to_string(dir.path().join(".stencil/ledger.toml")).unwrap();
        assert!(raw.contains("version = \"1\""));
        assert!(raw.contains("AGENTS.md"));
    }

    #[test]
    fn corrupt_ledger_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".stencil")).unwrap();
        std::fs::write(dir.path().join(".stencil/ledger.toml"), "files = 3 = 4").unwrap();

        let err = Ledger::load(&NormalizedPath::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Ledger { .. }));
    }

    #[test]
    fn forget_tree_drops_nested_records() {
        let mut ledger = Ledger::new();
        ledger.record_file(&rel(".stencil/legacy/a.md"), "sha256:1".into());
        ledger.record_created_directory(&rel(".stencil/legacy/sub"));
        ledger.record_file(&rel("AGENTS.md"), "sha256:2".into());

        ledger.forget_tree(&rel(".stencil/legacy"));
        assert_eq!(ledger.files().len(), 1);
        assert!(ledger.created_directories().is_empty());
    }

    #[test]
    fn first_json_original_wins() {
        let mut ledger = Ledger::new();
        let path = rel("package.json");
        ledger.record_json_original(&path, "{}");
        ledger.record_json_original(&path, "{\"scripts\":{}}");
        ledger.record_json_parents(&path, Vec::new());

        let record = ledger.json_record(&path).unwrap();
        assert_eq!(record.original.as_deref(), Some("{}"));
        assert!(record.created_parents.is_empty());

        ledger.forget_file(&path);
        assert!(ledger.is_empty());
    }
}
