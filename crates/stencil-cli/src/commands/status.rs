//! Status command implementation

use std::path::Path;

use colored::Colorize;
use stencil_core::InstallState;

use crate::error::Result;
use crate::project::Project;

/// Run the status command
pub fn run_status(path: &Path, json: bool) -> Result<()> {
    let project = Project::open(path)?;
    let status = project.engine().status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "stencil Status".bold());
    println!();
    println!("{}:       {}", "Path".dimmed(), project.context.root());
    println!(
        "{}:  {}",
        "Installed".dimmed(),
        status
            .installed
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("{}:  {}", "Available".dimmed(), status.available);

    let state = status.state.to_string();
    let state = match status.state {
        InstallState::UpToDate => state.green(),
        InstallState::UpgradeAvailable => state.yellow(),
        InstallState::NotInstalled => state.dimmed(),
        InstallState::NewerInstalled => state.red(),
    };
    println!("{}:      {}", "State".dimmed(), state);
    println!();
    println!(
        "{}: {} files, {} packages",
        "Tracked".dimmed(),
        status.tracked_files,
        status.tracked_packages
    );

    match status.state {
        InstallState::NotInstalled => {
            println!();
            println!("Run {} to install.", "stencil setup".cyan());
        }
        InstallState::UpgradeAvailable => {
            println!();
            println!("Run {} to upgrade.", "stencil upgrade".cyan());
        }
        _ => {}
    }

    Ok(())
}
