//! Setup, upgrade and reset command implementations
//!
//! Each runs one reconciliation pass and prints its summary. The exit code
//! is non-zero when any entry failed; package failures and warnings alone
//! still count as success.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use stencil_core::{Operation, ReconcileCache, ReconcileReport};

use crate::cli::PackageArgs;
use crate::error::{CliError, Result};
use crate::project::{Project, options};

/// Run the setup command
pub fn run_setup(path: &Path, dry_run: bool, packages: &PackageArgs, json: bool) -> Result<()> {
    let project = Project::open(path)?;
    if !json {
        println!(
            "{} Setting up stencil {} in {}",
            "=>".blue().bold(),
            project.schema.version(),
            project.context.root().as_str().yellow()
        );
    }
    reconcile(&project, Operation::Install, options(dry_run, false, packages), packages, json)
}

/// Run the upgrade command
pub fn run_upgrade(
    path: &Path,
    dry_run: bool,
    force: bool,
    packages: &PackageArgs,
    json: bool,
) -> Result<()> {
    let project = Project::open(path)?;
    if !json {
        println!(
            "{} Upgrading stencil to {} in {}",
            "=>".blue().bold(),
            project.schema.version(),
            project.context.root().as_str().yellow()
        );
    }
    reconcile(&project, Operation::Upgrade, options(dry_run, force, packages), packages, json)
}

/// Run the reset command
///
/// Asks before removing anything unless `yes` or `dry_run` is set. Without
/// a terminal to ask on, `--yes` is required.
pub fn run_reset(
    path: &Path,
    dry_run: bool,
    yes: bool,
    packages: &PackageArgs,
    json: bool,
) -> Result<()> {
    let project = Project::open(path)?;

    if !dry_run && !yes {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::user(
                "Refusing to reset without confirmation; pass --yes",
            ));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove stencil configuration from {}?",
                project.context.root()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{} Reset cancelled.", "=>".blue().bold());
            return Ok(());
        }
    }

    if !json {
        println!(
            "{} Removing stencil from {}",
            "=>".blue().bold(),
            project.context.root().as_str().yellow()
        );
    }
    reconcile(&project, Operation::Uninstall, options(dry_run, false, packages), packages, json)
}

fn reconcile(
    project: &Project,
    operation: Operation,
    options: stencil_core::ReconcileOptions,
    packages: &PackageArgs,
    json: bool,
) -> Result<()> {
    let manager = project.package_manager(packages);
    let report = project
        .engine()
        .with_package_manager(&manager)
        .with_options(options)
        .reconcile(operation, &mut ReconcileCache::new())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} finished with {} error(s)",
            operation,
            report.errors.len()
        )))
    }
}

/// Print a human-readable summary of a pass
pub fn print_report(report: &ReconcileReport) {
    let prefix = if report.dry_run {
        format!("{} ", "[dry-run]".dimmed())
    } else {
        String::new()
    };

    for path in &report.created {
        println!("   {}{} {}", prefix, "+".green(), path);
    }
    for path in &report.updated {
        println!("   {}{} {}", prefix, "~".yellow(), path);
    }
    for path in &report.deleted {
        println!("   {}{} {}", prefix, "-".red(), path);
    }
    for path in &report.preserved {
        println!(
            "   {}{} {} {}",
            prefix,
            "=".cyan(),
            path,
            "(customized, left in place)".dimmed()
        );
    }

    println!();
    let summary = format!(
        "{} created, {} updated, {} unchanged, {} deleted",
        report.created.len(),
        report.updated.len(),
        report.unchanged.len(),
        report.deleted.len()
    );
    if report.is_success() {
        println!("{} {}{}", "OK".green().bold(), prefix, summary);
    } else {
        println!("{} {}{}", "ERROR".red().bold(), prefix, summary);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("   {} {}: {}", "!".yellow(), warning.path.cyan(), warning.message);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for error in &report.errors {
            println!("   {} {}: {}", "!".red(), error.path.cyan(), error.message);
        }
    }

    print_packages(report, &prefix);
}

fn print_packages(report: &ReconcileReport, prefix: &str) {
    let packages = &report.packages;
    if packages.is_empty() {
        return;
    }
    println!();
    println!("{}", "Packages:".bold());
    if !packages.installed.is_empty() {
        println!(
            "   {}{} installed {}",
            prefix,
            "+".green(),
            packages.installed.join(", ")
        );
    }
    if !packages.uninstalled.is_empty() {
        println!(
            "   {}{} uninstalled {}",
            prefix,
            "-".red(),
            packages.uninstalled.join(", ")
        );
    }
    if !packages.already_present.is_empty() {
        println!(
            "   {} already present {}",
            "=".cyan(),
            packages.already_present.join(", ").dimmed()
        );
    }
    if !packages.errors.is_empty() {
        println!();
        println!(
            "{} Some packages need manual install:",
            "WARN".yellow().bold()
        );
        for failure in &packages.errors {
            println!(
                "   {} {}: {}",
                "!".yellow(),
                failure.packages.join(" ").cyan(),
                failure.message
            );
        }
    }
}
