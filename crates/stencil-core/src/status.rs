//! Installed version versus the version this tool provides

use semver::Version;
use serde::Serialize;

use crate::ledger::Ledger;
use crate::{ReconcileEngine, Result, marker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallState {
    NotInstalled,
    UpToDate,
    UpgradeAvailable,
    /// Set up by a newer schema; upgrading would downgrade
    NewerInstalled,
}

impl std::fmt::Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInstalled => write!(f, "not installed"),
            Self::UpToDate => write!(f, "up to date"),
            Self::UpgradeAvailable => write!(f, "upgrade available"),
            Self::NewerInstalled => write!(f, "installed by a newer version"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: InstallState,
    pub installed: Option<Version>,
    pub available: Version,
    /// Files with a checksum in the ledger
    pub tracked_files: usize,
    /// Packages stencil installed
    pub tracked_packages: usize,
}

impl ReconcileEngine<'_> {
    /// Compare the version marker with the schema version.
    ///
    /// # Errors
    ///
    /// Fails when the marker or the ledger cannot be read.
    pub fn status(&self) -> Result<StatusReport> {
        let root = self.context().root();
        let installed = marker::read(root)?;
        let ledger = Ledger::load(root)?;
        let available = self.schema().version().clone();

        let state = match &installed {
            None => InstallState::NotInstalled,
            Some(v) if *v == available => InstallState::UpToDate,
            Some(v) if *v < available => InstallState::UpgradeAvailable,
            Some(_) => InstallState::NewerInstalled,
        };

        Ok(StatusReport {
            state,
            installed,
            available,
            tracked_files: ledger.files().len(),
            tracked_packages: ledger.packages().len(),
        })
    }
}
