//! Package manager abstraction
//!
//! The engine decides *what* to install; a [`PackageManager`] decides *how*.
//! [`SystemPackageManager`] shells out to the project's own tools. An
//! engine without a manager leaves packages alone.

mod system;

pub use system::SystemPackageManager;

use stencil_schema::Ecosystem;

/// A package-manager call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("`{program}` not found on PATH")]
    CommandNotFound { program: String },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("No package manager available for {ecosystem} packages")]
    Unsupported { ecosystem: Ecosystem },
}

/// Installs and removes packages for one project.
///
/// Each call handles a whole group in one invocation of the underlying
/// tool. `dev` selects development dependencies where the tool
/// distinguishes them.
pub trait PackageManager {
    fn install(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError>;

    fn uninstall(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError>;
}
