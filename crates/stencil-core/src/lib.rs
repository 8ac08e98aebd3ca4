//! Schema reconciliation engine for stencil
//!
//! Brings a project from whatever state it is in to the state a
//! [`Schema`](stencil_schema::Schema) describes, through three operations:
//!
//! - **install**: purely additive; never removes or truncates user content
//! - **upgrade**: converges on a newer schema, removing deprecated entries
//!   first and keeping managed files the user customized
//! - **uninstall**: the inverse of install for every category
//!
//! Alongside the version marker, a ledger under `.stencil/` records what
//! stencil wrote and created, which is how customizations are told apart
//! from untouched output and how uninstall knows what is safe to remove.

pub mod cache;
pub mod check;
mod engine;
pub mod error;
pub mod ledger;
pub mod marker;
pub mod options;
pub mod packages;
pub mod report;
pub mod status;

pub use cache::ReconcileCache;
pub use check::{CheckReport, CheckStatus, DriftItem};
pub use engine::ReconcileEngine;
pub use error::{Error, Result};
pub use ledger::{FileRecord, InstalledPackage, JsonRecord, Ledger};
pub use options::{DEFAULT_PACKAGE_TIMEOUT, Operation, ReconcileOptions};
pub use packages::{PackageError, PackageManager, SystemPackageManager};
pub use report::{
    ChangeAction, EntryError, PackageFailure, PackageReport, PlannedChange, ReconcileReport,
    Warning,
};
pub use status::{InstallState, StatusReport};
