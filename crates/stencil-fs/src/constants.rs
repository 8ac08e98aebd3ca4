//! Well-known paths inside a provisioned project.

use std::path::Path;

/// Fixed project-relative paths that stencil reads or writes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilPath {
    /// The `.stencil` directory, owned by the tool
    StateDir,
    /// Single-line file holding the schema version last applied
    VersionMarker,
    /// Checksums and creation records for everything the tool wrote
    Ledger,
    /// The `.git` directory
    GitDir,
}

impl StencilPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateDir => ".stencil",
            Self::VersionMarker => ".stencil/version",
            Self::Ledger => ".stencil/ledger.toml",
            Self::GitDir => ".git",
        }
    }
}

impl AsRef<Path> for StencilPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for StencilPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for StencilPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
