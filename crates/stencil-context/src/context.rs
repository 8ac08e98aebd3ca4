//! The immutable project snapshot handed to every generator

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use stencil_fs::NormalizedPath;

/// Language ecosystems present in the project, each detected independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Languages {
    pub javascript: bool,
    pub typescript: bool,
    pub python: bool,
    pub go: bool,
    pub rust: bool,
}

impl Languages {
    pub fn any(&self) -> bool {
        self.javascript || self.typescript || self.python || self.go || self.rust
    }
}

/// Tooling the user already has configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExistingTooling {
    /// Linters with a config file present (e.g. `eslint`, `ruff`)
    pub linters: BTreeSet<String>,
    /// Formatters with a config file present (e.g. `prettier`, `black`)
    pub formatters: BTreeSet<String>,
    /// Known config files found at the root, relative paths
    pub config_files: BTreeSet<String>,
    /// Test frameworks found among dependencies (e.g. `playwright`, `pytest`)
    pub test_frameworks: BTreeSet<String>,
}

impl ExistingTooling {
    pub fn has_linter(&self, name: &str) -> bool {
        self.linters.contains(name)
    }

    pub fn has_formatter(&self, name: &str) -> bool {
        self.formatters.contains(name)
    }

    pub fn has_config(&self, rel: &str) -> bool {
        self.config_files.contains(rel)
    }

    /// Whether a browser end-to-end framework is present.
    pub fn has_e2e_framework(&self) -> bool {
        self.test_frameworks.contains("playwright") || self.test_frameworks.contains("cypress")
    }
}

/// JavaScript package manager, inferred from lockfiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsPackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl JsPackageManager {
    pub fn program(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
        }
    }
}

/// Python installer, inferred from lockfiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PythonInstaller {
    Uv,
    Pip,
}

/// Detected facts about a project. Built once per invocation, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectContext {
    root: NormalizedPath,
    languages: Languages,
    tooling: ExistingTooling,
    dependencies: BTreeMap<String, String>,
    js_package_manager: Option<JsPackageManager>,
    python_installer: Option<PythonInstaller>,
    is_version_controlled: bool,
}

impl ProjectContext {
    /// Start building a context by hand, for tests and embedders.
    pub fn builder(root: impl Into<NormalizedPath>) -> ProjectContextBuilder {
        ProjectContextBuilder {
            inner: ProjectContext {
                root: root.into(),
                languages: Languages::default(),
                tooling: ExistingTooling::default(),
                dependencies: BTreeMap::new(),
                js_package_manager: None,
                python_installer: None,
                is_version_controlled: false,
            },
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    pub fn tooling(&self) -> &ExistingTooling {
        &self.tooling
    }

    /// Package name to version, aggregated across root and workspace packages.
    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn js_package_manager(&self) -> Option<JsPackageManager> {
        self.js_package_manager
    }

    pub fn python_installer(&self) -> Option<PythonInstaller> {
        self.python_installer
    }

    pub fn is_version_controlled(&self) -> bool {
        self.is_version_controlled
    }
}

/// Builder for [`ProjectContext`].
#[derive(Debug, Clone)]
pub struct ProjectContextBuilder {
    inner: ProjectContext,
}

impl ProjectContextBuilder {
    pub fn languages(mut self, languages: Languages) -> Self {
        self.inner.languages = languages;
        self
    }

    pub fn javascript(mut self) -> Self {
        self.inner.languages.javascript = true;
        self
    }

    pub fn typescript(mut self) -> Self {
        self.inner.languages.typescript = true;
        self
    }

    pub fn python(mut self) -> Self {
        self.inner.languages.python = true;
        self
    }

    pub fn go(mut self) -> Self {
        self.inner.languages.go = true;
        self
    }

    pub fn rust(mut self) -> Self {
        self.inner.languages.rust = true;
        self
    }

    pub fn tooling(mut self, tooling: ExistingTooling) -> Self {
        self.inner.tooling = tooling;
        self
    }

    pub fn linter(mut self, name: impl Into<String>) -> Self {
        self.inner.tooling.linters.insert(name.into());
        self
    }

    pub fn test_framework(mut self, name: impl Into<String>) -> Self {
        self.inner.tooling.test_frameworks.insert(name.into());
        self
    }

    /// Record a dependency; the first version seen for a name wins.
    pub fn dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.inner
            .dependencies
            .entry(name.into())
            .or_insert_with(|| version.into());
        self
    }

    pub fn dependencies(mut self, deps: BTreeMap<String, String>) -> Self {
        for (name, version) in deps {
            self.inner.dependencies.entry(name).or_insert(version);
        }
        self
    }

    pub fn js_package_manager(mut self, pm: Option<JsPackageManager>) -> Self {
        self.inner.js_package_manager = pm;
        self
    }

    pub fn python_installer(mut self, installer: Option<PythonInstaller>) -> Self {
        self.inner.python_installer = installer;
        self
    }

    pub fn version_controlled(mut self, vcs: bool) -> Self {
        self.inner.is_version_controlled = vcs;
        self
    }

    pub fn build(self) -> ProjectContext {
        self.inner
    }
}
