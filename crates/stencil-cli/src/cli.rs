//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// stencil - Provision, upgrade and remove standard project configuration
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root to operate on
    #[arg(long, global = true, env = "STENCIL_PROJECT", default_value = ".")]
    pub path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Package-manager flags shared by the mutating commands
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PackageArgs {
    /// Leave packages alone; only files are reconciled
    #[arg(long)]
    pub skip_packages: bool,

    /// Seconds to wait for each package-manager invocation
    #[arg(
        long,
        env = "STENCIL_PACKAGE_TIMEOUT",
        default_value_t = 300,
        value_name = "SECS"
    )]
    pub package_timeout: u64,
}

impl PackageArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.package_timeout)
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install stencil's configuration into the project
    ///
    /// Existing files stencil manages are left alone if they differ;
    /// JSON files only gain the keys stencil owns.
    ///
    /// Examples:
    ///   stencil setup                  # Install into the current directory
    ///   stencil setup --dry-run        # Show what would change
    ///   stencil setup --skip-packages  # Files only
    Setup {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        packages: PackageArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bring an existing installation up to this version
    Upgrade {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Upgrade even if the project was set up by a newer version
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        packages: PackageArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove everything stencil added, keeping user customizations
    Reset {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        packages: PackageArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the project for missing or drifted configuration
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Preview what upgrade (or reset) would change, as unified diffs
    Diff {
        /// Preview a reset instead of an upgrade
        #[arg(long)]
        reset: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show installed and available schema versions
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
