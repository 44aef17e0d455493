//! Backup commands

use std::path::Path;

use colored::Colorize;

use cami_core::BackupManager;

use crate::error::{CliError, Result};
use crate::interactive;

/// Run the backup list command
pub fn run_backup_list(target: &Path) -> Result<()> {
    let manager = BackupManager::new();
    let analysis = manager.analyze(target)?;

    if analysis.backups.is_empty() {
        println!("{} for {}", "No backups".dimmed(), target.display());
        return Ok(());
    }

    println!(
        "{} ({}, {})",
        "Backups".bold(),
        analysis.total_backups,
        format_size(analysis.total_size_bytes)
    );
    for backup in &analysis.backups {
        println!(
            "  {}  {:>10}  {}",
            backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
            format_size(backup.size_bytes),
            backup.path.display()
        );
    }

    if manager.should_suggest_cleanup(target)? {
        println!();
        println!(
            "{} many backups; run {}",
            "hint:".cyan(),
            format!("cami backup cleanup {}", target.display()).cyan()
        );
    }
    Ok(())
}

/// Run the backup restore command
pub fn run_backup_restore(backup: &Path, target: &Path, yes: bool) -> Result<()> {
    if !yes
        && target.exists()
        && !interactive::confirm(&format!("Replace {} with the backup?", target.display()))?
    {
        return Err(CliError::user("restore cancelled"));
    }

    BackupManager::new().restore(backup, target)?;
    println!("{} Restored {} from {}", "✓".green(), target.display(), backup.display());
    Ok(())
}

/// Run the backup cleanup command
pub fn run_backup_cleanup(target: &Path, keep: usize) -> Result<()> {
    let result = BackupManager::new().cleanup(target, keep)?;
    println!(
        "{} Removed {} backups, freed {}",
        "✓".green(),
        result.removed_count,
        format_size(result.freed_bytes)
    );
    for kept in &result.kept {
        println!("  {} {}", "kept".dimmed(), kept.display());
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_backup_round_trip() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("project");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("file.txt"), "original").unwrap();
        let backup = BackupManager::new().create(&target).unwrap();
        std::fs::write(target.join("file.txt"), "changed").unwrap();

        assert!(run_backup_list(&target).is_ok());
        assert!(run_backup_restore(&backup, &target, true).is_ok());
        assert_eq!(std::fs::read_to_string(target.join("file.txt")).unwrap(), "original");
        assert!(run_backup_cleanup(&target, 0).is_ok());
    }
}
