//! Command implementations for stencil-cli

pub mod check;
pub mod diff;
pub mod lifecycle;
pub mod status;

pub use check::run_check;
pub use diff::run_diff;
pub use lifecycle::{run_reset, run_setup, run_upgrade};
pub use status::run_status;
