//! Operations and pass options

use std::time::Duration;

use serde::Serialize;

/// Default bound on a single package-manager call.
pub const DEFAULT_PACKAGE_TIMEOUT: Duration = Duration::from_secs(300);

/// The three lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Install,
    Upgrade,
    Uninstall,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Upgrade => write!(f, "upgrade"),
            Self::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Options for a reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Compute the report and planned changes without touching disk
    pub dry_run: bool,
    /// Bound on each package-manager call
    pub package_timeout: Duration,
    /// Leave packages alone entirely
    pub skip_packages: bool,
    /// Allow upgrading a project set up by a newer schema
    pub force: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            package_timeout: DEFAULT_PACKAGE_TIMEOUT,
            skip_packages: false,
            force: false,
        }
    }
}
