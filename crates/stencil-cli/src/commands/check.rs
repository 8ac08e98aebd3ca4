//! Check command implementation

use std::path::Path;

use colored::Colorize;
use stencil_core::{CheckReport, CheckStatus, DriftItem, ReconcileCache};

use crate::error::{CliError, Result};
use crate::project::Project;

/// Run the check command
///
/// Read-only. Fails unless the project is healthy so it can gate CI.
pub fn run_check(path: &Path, json: bool) -> Result<()> {
    let project = Project::open(path)?;
    let report = project.engine().check(&mut ReconcileCache::new())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} Checking stencil configuration...",
            "=>".blue().bold()
        );
        print_check(&report);
    }

    match report.status {
        CheckStatus::Healthy => Ok(()),
        CheckStatus::Missing => Err(CliError::user("Configuration is incomplete")),
        CheckStatus::Drifted => Err(CliError::user("Configuration has drifted")),
        CheckStatus::Broken => Err(CliError::user("Installation state is unreadable")),
    }
}

fn print_items(items: &[DriftItem], bullet: colored::ColoredString) {
    for item in items {
        println!(
            "   {} {} ({}): {}",
            bullet,
            item.path.cyan(),
            item.category.dimmed(),
            item.description
        );
    }
}

fn print_check(report: &CheckReport) {
    for message in &report.messages {
        println!("   {} {}", "i".blue(), message);
    }

    match report.status {
        CheckStatus::Healthy => {
            println!("{} Project is healthy. No drift detected.", "OK".green().bold());
        }
        CheckStatus::Missing => {
            println!("{} Some entries are missing:", "MISSING".yellow().bold());
            print_items(&report.missing, "-".yellow());
            println!();
            println!("Run {} to repair.", "stencil upgrade".cyan());
        }
        CheckStatus::Drifted => {
            println!("{} Configuration has drifted:", "DRIFTED".red().bold());
            print_items(&report.drifted, "!".red());
            if !report.missing.is_empty() {
                println!();
                println!("{} Also missing:", "MISSING".yellow().bold());
                print_items(&report.missing, "-".yellow());
            }
            println!();
            println!("Run {} to see the changes.", "stencil diff".cyan());
        }
        CheckStatus::Broken => {
            println!("{} Installation state is broken.", "BROKEN".red().bold());
            println!();
            println!("Manual intervention may be required.");
        }
    }
}
