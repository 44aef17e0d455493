//! Init command implementation

use std::path::Path;

use colored::Colorize;

use cami_core::Workspace;

use crate::error::Result;

/// Pre-workspace config file in the home directory
pub const LEGACY_CONFIG_FILE: &str = ".cami.json";

/// Run the init command
pub fn run_init(ws: &Workspace, legacy_config: Option<&Path>) -> Result<()> {
    let created = ws.init()?;

    if let Some(legacy) = legacy_config {
        if ws.config().migrate_legacy(legacy)? {
            println!(
                "{} Migrated {} into {}",
                "✓".green(),
                legacy.display(),
                ws.config().path().display()
            );
        }
    }

    if created {
        println!("{} Initialized workspace at {}", "✓".green(), ws.root().display());
    } else {
        println!("Workspace already initialized at {}", ws.root().display());
    }
    println!();
    println!("Next: {} or {}", "cami source add <git-url>".cyan(), "cami source reconcile".cyan());
    Ok(())
}
