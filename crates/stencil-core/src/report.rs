//! What a reconciliation pass did, or would do

use serde::Serialize;

use crate::Operation;

/// A per-entry failure. The pass continued past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub path: String,
    pub message: String,
}

/// A per-entry problem that did not count as a failure, such as a
/// malformed JSON target that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub path: String,
    pub message: String,
}

/// A package-manager call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFailure {
    pub packages: Vec<String>,
    pub message: String,
}

/// Package outcomes, kept apart from file outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub installed: Vec<String>,
    pub uninstalled: Vec<String>,
    /// Required packages the project already depended on
    pub already_present: Vec<String>,
    pub errors: Vec<PackageFailure>,
}

impl PackageReport {
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
            && self.uninstalled.is_empty()
            && self.already_present.is_empty()
            && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAction {
    CreateDir,
    Create,
    Update,
    Delete,
    DeleteDir,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir => write!(f, "create directory"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::DeleteDir => write!(f, "delete directory"),
        }
    }
}

/// One change a dry run would have made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub path: String,
    pub action: ChangeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Result of one reconciliation pass.
///
/// Directory paths carry a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub operation: Operation,
    pub dry_run: bool,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
    /// Files left alone because the user customized them
    pub preserved: Vec<String>,
    pub warnings: Vec<Warning>,
    pub errors: Vec<EntryError>,
    pub packages: PackageReport,
    /// Populated on dry runs only
    pub planned: Vec<PlannedChange>,
}

impl ReconcileReport {
    pub fn new(operation: Operation, dry_run: bool) -> Self {
        Self {
            operation,
            dry_run,
            created: Vec::new(),
            updated: Vec::new(),
            unchanged: Vec::new(),
            deleted: Vec::new(),
            preserved: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            packages: PackageReport::default(),
            planned: Vec::new(),
        }
    }

    /// No per-entry errors. Package failures do not count.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    pub(crate) fn error(&mut self, path: impl ToString, message: impl ToString) {
        let entry = EntryError {
            path: path.to_string(),
            message: message.to_string(),
        };
        tracing::warn!(path = %entry.path, error = %entry.message, "entry failed");
        self.errors.push(entry);
    }

    pub(crate) fn warn(&mut self, path: impl ToString, message: impl ToString) {
        let warning = Warning {
            path: path.to_string(),
            message: message.to_string(),
        };
        tracing::warn!(path = %warning.path, "{}", warning.message);
        self.warnings.push(warning);
    }
}
