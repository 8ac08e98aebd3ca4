//! The schema type and its builder

use std::collections::{BTreeMap, BTreeSet};

use semver::Version;
use stencil_fs::RelPath;

use crate::{
    Error, FileDefinition, JsonMergeDefinition, PackageGroup, PackageSet, Predicate, Result,
    TextPatchDefinition, validation,
};

/// Deletion policy of a declared directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    /// Removed recursively on uninstall.
    Owned,
    /// Holds user content too; only stencil's own files are removed.
    Shared,
    /// Never removed while it holds anything.
    Preserved,
}

impl DirectoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owned => "owned directory",
            Self::Shared => "shared directory",
            Self::Preserved => "preserved directory",
        }
    }
}

/// Category of a declared file target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Owned,
    Managed,
    JsonMerge,
    TextPatch,
}

impl FileKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owned => "owned file",
            Self::Managed => "managed file",
            Self::JsonMerge => "JSON merge target",
            Self::TextPatch => "text patch target",
        }
    }
}

/// A validated, versioned description of everything stencil manages.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) version: Version,
    pub(crate) owned_directories: BTreeSet<RelPath>,
    pub(crate) shared_directories: BTreeSet<RelPath>,
    pub(crate) preserved_directories: BTreeSet<RelPath>,
    pub(crate) owned_files: BTreeMap<RelPath, FileDefinition>,
    pub(crate) managed_files: BTreeMap<RelPath, FileDefinition>,
    pub(crate) json_merges: BTreeMap<RelPath, JsonMergeDefinition>,
    pub(crate) text_patches: BTreeMap<RelPath, TextPatchDefinition>,
    pub(crate) deprecated_files: BTreeSet<RelPath>,
    pub(crate) deprecated_directories: BTreeSet<RelPath>,
    pub(crate) deprecated_packages: Vec<PackageGroup>,
    pub(crate) packages: PackageSet,
}

impl Schema {
    pub fn builder(version: &str) -> SchemaBuilder {
        SchemaBuilder::new(version)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn owned_directories(&self) -> &BTreeSet<RelPath> {
        &self.owned_directories
    }

    pub fn shared_directories(&self) -> &BTreeSet<RelPath> {
        &self.shared_directories
    }

    pub fn preserved_directories(&self) -> &BTreeSet<RelPath> {
        &self.preserved_directories
    }

    /// Every declared directory with its kind, parents before children.
    pub fn directories(&self) -> Vec<(&RelPath, DirectoryKind)> {
        let mut all: Vec<(&RelPath, DirectoryKind)> = self
            .owned_directories
            .iter()
            .map(|d| (d, DirectoryKind::Owned))
            .chain(self.shared_directories.iter().map(|d| (d, DirectoryKind::Shared)))
            .chain(
                self.preserved_directories
                    .iter()
                    .map(|d| (d, DirectoryKind::Preserved)),
            )
            .collect();
        all.sort_by(|a, b| a.0.depth().cmp(&b.0.depth()).then_with(|| a.0.cmp(b.0)));
        all
    }

    /// The owned directory containing `path`, if any.
    pub fn owning_directory(&self, path: &RelPath) -> Option<&RelPath> {
        self.owned_directories.iter().find(|dir| path.is_within(dir))
    }

    pub fn owned_files(&self) -> &BTreeMap<RelPath, FileDefinition> {
        &self.owned_files
    }

    pub fn managed_files(&self) -> &BTreeMap<RelPath, FileDefinition> {
        &self.managed_files
    }

    pub fn json_merges(&self) -> &BTreeMap<RelPath, JsonMergeDefinition> {
        &self.json_merges
    }

    pub fn text_patches(&self) -> &BTreeMap<RelPath, TextPatchDefinition> {
        &self.text_patches
    }

    pub fn deprecated_files(&self) -> &BTreeSet<RelPath> {
        &self.deprecated_files
    }

    pub fn deprecated_directories(&self) -> &BTreeSet<RelPath> {
        &self.deprecated_directories
    }

    pub fn deprecated_packages(&self) -> &[PackageGroup] {
        &self.deprecated_packages
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    /// Category of a declared file target.
    pub fn file_kind(&self, path: &RelPath) -> Option<FileKind> {
        if self.owned_files.contains_key(path) {
            Some(FileKind::Owned)
        } else if self.managed_files.contains_key(path) {
            Some(FileKind::Managed)
        } else if self.json_merges.contains_key(path) {
            Some(FileKind::JsonMerge)
        } else if self.text_patches.contains_key(path) {
            Some(FileKind::TextPatch)
        } else {
            None
        }
    }
}

/// Incremental schema construction. Path errors are held until [`build`](Self::build).
#[derive(Debug)]
pub struct SchemaBuilder {
    version: String,
    schema: Schema,
    error: Option<Error>,
}

impl SchemaBuilder {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            schema: Schema {
                version: Version::new(0, 0, 0),
                owned_directories: BTreeSet::new(),
                shared_directories: BTreeSet::new(),
                preserved_directories: BTreeSet::new(),
                owned_files: BTreeMap::new(),
                managed_files: BTreeMap::new(),
                json_merges: BTreeMap::new(),
                text_patches: BTreeMap::new(),
                deprecated_files: BTreeSet::new(),
                deprecated_directories: BTreeSet::new(),
                deprecated_packages: Vec::new(),
                packages: PackageSet::default(),
            },
            error: None,
        }
    }

    /// Keep the first error only.
    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn parse(&mut self, raw: &str) -> Option<RelPath> {
        match RelPath::parse(raw) {
            Ok(path) => Some(path),
            Err(e) => {
                self.fail(Error::InvalidPath(e));
                None
            }
        }
    }

    fn insert_file<T>(
        &mut self,
        kind: FileKind,
        raw: &str,
        def: T,
        select: fn(&mut Schema) -> &mut BTreeMap<RelPath, T>,
    ) {
        let Some(path) = self.parse(raw) else {
            return;
        };
        if select(&mut self.schema).insert(path.clone(), def).is_some() {
            self.fail(Error::DuplicatePath {
                path: path.to_string(),
                first: kind.label(),
                second: kind.label(),
            });
        }
    }

    pub fn owned_dir(mut self, path: &str) -> Self {
        if let Some(path) = self.parse(path) {
            self.schema.owned_directories.insert(path);
        }
        self
    }

    pub fn shared_dir(mut self, path: &str) -> Self {
        if let Some(path) = self.parse(path) {
            self.schema.shared_directories.insert(path);
        }
        self
    }

    pub fn preserved_dir(mut self, path: &str) -> Self {
        if let Some(path) = self.parse(path) {
            self.schema.preserved_directories.insert(path);
        }
        self
    }

    pub fn owned_file(mut self, path: &str, def: FileDefinition) -> Self {
        self.insert_file(FileKind::Owned, path, def, |s| &mut s.owned_files);
        self
    }

    pub fn managed_file(mut self, path: &str, def: FileDefinition) -> Self {
        self.insert_file(FileKind::Managed, path, def, |s| &mut s.managed_files);
        self
    }

    pub fn json_merge(mut self, path: &str, def: JsonMergeDefinition) -> Self {
        self.insert_file(FileKind::JsonMerge, path, def, |s| &mut s.json_merges);
        self
    }

    pub fn text_patch(mut self, path: &str, def: TextPatchDefinition) -> Self {
        self.insert_file(FileKind::TextPatch, path, def, |s| &mut s.text_patches);
        self
    }

    pub fn deprecated_file(mut self, path: &str) -> Self {
        if let Some(path) = self.parse(path) {
            self.schema.deprecated_files.insert(path);
        }
        self
    }

    pub fn deprecated_dir(mut self, path: &str) -> Self {
        if let Some(path) = self.parse(path) {
            self.schema.deprecated_directories.insert(path);
        }
        self
    }

    pub fn deprecated_packages(mut self, group: PackageGroup) -> Self {
        self.schema.deprecated_packages.push(group);
        self
    }

    pub fn packages(mut self, group: PackageGroup) -> Self {
        self.schema.packages.base.push(group);
        self
    }

    pub fn conditional_packages(mut self, predicate: Predicate, group: PackageGroup) -> Self {
        self.schema.packages.conditional.push((predicate, group));
        self
    }

    /// Validate and produce the schema.
    ///
    /// # Errors
    ///
    /// Returns the first authoring mistake found: an invalid path or
    /// version, a path declared in two categories, a live path that is also
    /// deprecated, overlapping JSON keys, or a text patch whose content does
    /// not contain its marker.
    pub fn build(self) -> Result<Schema> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut schema = self.schema;
        schema.version = Version::parse(&self.version).map_err(|e| Error::InvalidVersion {
            version: self.version.clone(),
            message: e.to_string(),
        })?;
        validation::validate(&schema)?;
        tracing::debug!(version = %schema.version, "schema validated");
        Ok(schema)
    }
}
