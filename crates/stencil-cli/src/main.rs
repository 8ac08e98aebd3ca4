//! stencil CLI
//!
//! Installs, upgrades and removes stencil's project configuration.

mod cli;
mod commands;
mod error;
mod project;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(&cli.path, cmd),
        None => {
            println!("{} Project configuration manager", "stencil".green().bold());
            println!();
            println!("Run {} for available commands.", "stencil --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let installed = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    };
    if installed {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(path: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Setup {
            dry_run,
            packages,
            json,
        } => commands::run_setup(path, dry_run, &packages, json),
        Commands::Upgrade {
            dry_run,
            force,
            packages,
            json,
        } => commands::run_upgrade(path, dry_run, force, &packages, json),
        Commands::Reset {
            dry_run,
            yes,
            packages,
            json,
        } => commands::run_reset(path, dry_run, yes, &packages, json),
        Commands::Check { json } => commands::run_check(path, json),
        Commands::Diff { reset, json } => commands::run_diff(path, reset, json),
        Commands::Status { json } => commands::run_status(path, json),
    }
}
