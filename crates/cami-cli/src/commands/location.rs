//! Deploy location commands

use std::path::Path;

use colored::Colorize;

use cami_core::Workspace;

use crate::error::Result;

/// Run the location list command
pub fn run_location_list(ws: &Workspace) -> Result<()> {
    let config = ws.load_config()?;

    println!("{}:", "Deploy Locations".bold());
    if config.deploy_locations.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "cami location add".cyan());
        return Ok(());
    }
    for location in &config.deploy_locations {
        let marker = if location.path.is_dir() {
            "+".green()
        } else {
            "!".red()
        };
        println!("  {} {:<20} {}", marker, location.name.cyan(), location.path.display());
    }
    Ok(())
}

/// Run the location add command
pub fn run_location_add(ws: &Workspace, name: &str, path: &Path) -> Result<()> {
    let path = cami_fs::absolute_path(path)?;
    ws.config().update(|config| config.add_location(name, &path))?;
    println!("{} Added location {} ({})", "✓".green(), name.cyan(), path.display());
    Ok(())
}

/// Run the location remove command
pub fn run_location_remove(ws: &Workspace, name: &str) -> Result<()> {
    let removed = ws.config().update(|config| config.remove_location(name))?;
    println!("{} Removed location {} ({})", "✓".green(), removed.name.cyan(), removed.path.display());
    Ok(())
}
