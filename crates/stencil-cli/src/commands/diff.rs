//! Diff command implementation
//!
//! Previews what upgrade (or reset) would change without applying it,
//! rendering each planned file change as a unified diff.

use std::path::Path;

use colored::Colorize;
use serde_json::json;
use similar::TextDiff;
use stencil_core::{
    ChangeAction, Operation, PlannedChange, ReconcileCache, ReconcileOptions, ReconcileReport,
};

use crate::error::Result;
use crate::project::Project;

/// Run the diff command
///
/// Packages are never touched; the preview covers files only.
pub fn run_diff(path: &Path, reset: bool, json: bool) -> Result<()> {
    let project = Project::open(path)?;
    let operation = if reset {
        Operation::Uninstall
    } else {
        Operation::Upgrade
    };
    let options = ReconcileOptions {
        dry_run: true,
        skip_packages: true,
        ..ReconcileOptions::default()
    };
    let report = project
        .engine()
        .with_options(options)
        .reconcile(operation, &mut ReconcileCache::new())?;

    if json {
        let json_output = json!({
            "operation": report.operation,
            "has_changes": !report.planned.is_empty(),
            "changes": report.planned,
            "preserved": report.preserved,
            "warnings": report.warnings,
            "errors": report.errors,
            "success": report.is_success(),
        });
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else {
        print_diff_output(&project, &report);
    }

    Ok(())
}

/// Unified diff for one planned change. Directory changes have no body.
pub fn render_change(change: &PlannedChange) -> Option<String> {
    if matches!(change.action, ChangeAction::CreateDir | ChangeAction::DeleteDir) {
        return None;
    }
    let before = change.before.as_deref().unwrap_or("");
    let after = change.after.as_deref().unwrap_or("");
    let old_header = match change.action {
        ChangeAction::Create => "/dev/null".to_string(),
        _ => format!("a/{}", change.path),
    };
    let new_header = match change.action {
        ChangeAction::Delete => "/dev/null".to_string(),
        _ => format!("b/{}", change.path),
    };
    let diff = TextDiff::from_lines(before, after);
    Some(
        diff.unified_diff()
            .context_radius(3)
            .header(&old_header, &new_header)
            .to_string(),
    )
}

fn print_diff_output(project: &Project, report: &ReconcileReport) {
    if report.planned.is_empty() && report.errors.is_empty() {
        println!(
            "{} No changes needed. Project is up to date.",
            "OK".green().bold()
        );
        return;
    }

    println!(
        "{} {} ({})",
        "Diff".blue().bold(),
        project.context.root().as_str().yellow(),
        report.operation.to_string().cyan()
    );
    println!();

    for change in &report.planned {
        match render_change(change) {
            None => {
                let marker = match change.action {
                    ChangeAction::CreateDir => "+".green(),
                    _ => "-".red(),
                };
                println!("{} {} {}", marker, change.action, change.path);
            }
            Some(body) => {
                for line in body.lines() {
                    if line.starts_with("+++") || line.starts_with("---") {
                        println!("{}", line.bold());
                    } else if line.starts_with('+') {
                        println!("{}", line.green());
                    } else if line.starts_with('-') {
                        println!("{}", line.red());
                    } else if line.starts_with("@@") {
                        println!("{}", line.cyan());
                    } else {
                        println!("{line}");
                    }
                }
            }
        }
    }

    if !report.preserved.is_empty() {
        println!();
        println!("{}", "Left in place (customized):".bold());
        for path in &report.preserved {
            println!("  {} {}", "=".cyan(), path);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for error in &report.errors {
            println!("  {} {}: {}", "!".red(), error.path, error.message);
        }
    }

    let command = if report.operation == Operation::Uninstall {
        "stencil reset"
    } else {
        "stencil upgrade"
    };
    println!();
    println!("Run {} to apply these changes.", command.cyan());
}
