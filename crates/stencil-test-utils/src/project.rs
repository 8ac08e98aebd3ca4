//! [`TestProject`] builder for stencil test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary project directory with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use stencil_test_utils::TestProject;
///
/// let project = TestProject::new()
///     .with_file("package.json", r#"{"name": "app"}"#)
///     .with_file(".gitignore", "node_modules\n");
/// project.assert_file_contains(".gitignore", "node_modules");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A project with a minimal `package.json`.
    pub fn javascript() -> Self {
        Self::new().with_file(
            "package.json",
            "{\n  \"name\": \"app\",\n  \"version\": \"1.0.0\"\n}\n",
        )
    }

    /// A project with a minimal `pyproject.toml`.
    pub fn python() -> Self {
        Self::new().with_file(
            "pyproject.toml",
            "[project]\nname = \"app\"\nversion = \"0.1.0\"\ndependencies = []\n",
        )
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Builder form of [`write`](Self::write).
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    /// Builder form of [`mkdir`](Self::mkdir).
    pub fn with_dir(self, rel: &str) -> Self {
        self.mkdir(rel);
        self
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
    }

    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.path(rel)).unwrap();
    }

    /// Read the file at `rel` as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read file {}: {e}", path.display()))
    }

    /// Parse the file at `rel` as JSON.
    pub fn read_json(&self, rel: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(rel))
            .unwrap_or_else(|e| panic!("{rel} is not valid JSON: {e}"))
    }

    pub fn remove(&self, rel: &str) {
        let path = self.path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    pub fn assert_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }

    /// Assert that the file at `rel` does not contain `content`.
    pub fn assert_file_not_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            !file_content.contains(content),
            "File {} unexpectedly contains: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }

    /// Assert that the file at `rel` equals `expected` byte for byte.
    pub fn assert_file_eq(&self, rel: &str, expected: &str) {
        pretty_assertions::assert_eq!(self.read(rel), expected, "content of {rel}");
    }
}
