//! Timestamped directory backups
//!
//! A backup of `/a/b/target` is a full copy placed next to it, at
//! `/a/b/.cami-backup-target-YYYYmmdd-HHMMSS`. Backups taken within the same
//! second get a `-N` suffix. Listing, analyzing and cleaning up a target only
//! see backups carrying its name, so siblings sharing a parent directory keep
//! separate histories.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Name prefix of backup directories
pub const BACKUP_PREFIX: &str = ".cami-backup-";

/// Backups kept by a cleanup when no count is given
pub const DEFAULT_KEEP_RECENT: usize = 3;

/// Backup count at which a cleanup is suggested
pub const CLEANUP_THRESHOLD: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const TIMESTAMP_LEN: usize = 15;

/// A backup directory on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: u64,
    #[serde(skip)]
    sequence: u32,
}

/// Summary of the backups next to a target
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveAnalysis {
    pub total_backups: usize,
    pub total_size_bytes: u64,
    pub oldest_backup: Option<DateTime<Utc>>,
    pub newest_backup: Option<DateTime<Utc>>,
    pub backups: Vec<BackupInfo>,
}

/// Outcome of [`BackupManager::cleanup`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupResult {
    pub removed_count: usize,
    pub freed_bytes: u64,
    pub kept: Vec<PathBuf>,
}

/// Creates, lists, restores and prunes directory backups
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupManager;

impl BackupManager {
    pub fn new() -> Self {
        Self
    }

    /// Copy `target` to a new sibling backup directory.
    ///
    /// # Errors
    ///
    /// Fails if `target` is not an existing directory or the copy fails. A
    /// partially written backup is removed before returning.
    pub fn create(&self, target: &Path) -> Result<PathBuf> {
        if !target.is_dir() {
            return Err(Error::not_found("directory", target));
        }

        let backup = next_backup_path(target)?;
        if let Err(e) = copy_dir(target, &backup) {
            if let Err(cleanup) = fs::remove_dir_all(&backup) {
                warn!(path = %backup.display(), error = %cleanup, "Failed to remove partial backup");
            }
            return Err(e);
        }

        info!(target = %target.display(), backup = %backup.display(), "Created backup");
        Ok(backup)
    }

    /// Backups of `target`, newest first.
    pub fn list(&self, target: &Path) -> Result<Vec<BackupInfo>> {
        let parent = parent_dir(target);
        let prefix = backup_prefix(target);
        let entries = fs::read_dir(parent).map_err(|e| cami_fs::Error::io(parent, e))?;

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stamp) = name.strip_prefix(&prefix) else {
                continue;
            };
            // A sibling whose name extends ours, e.g. `a-b` next to `a`
            let (Some(timestamp), sequence) = parse_stamp(stamp) else {
                continue;
            };
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }

            let path = entry.path();
            backups.push(BackupInfo {
                size_bytes: dir_size(&path),
                path,
                timestamp,
                sequence,
            });
        }

        backups.sort_by(|a, b| {
            (b.timestamp, b.sequence).cmp(&(a.timestamp, a.sequence))
        });
        Ok(backups)
    }

    pub fn analyze(&self, target: &Path) -> Result<ArchiveAnalysis> {
        let backups = self.list(target)?;
        Ok(ArchiveAnalysis {
            total_backups: backups.len(),
            total_size_bytes: backups.iter().map(|b| b.size_bytes).sum(),
            newest_backup: backups.first().map(|b| b.timestamp),
            oldest_backup: backups.last().map(|b| b.timestamp),
            backups,
        })
    }

    /// Replace `target` with the contents of `backup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBackup`] if `backup` is not a directory named
    /// with the backup prefix.
    pub fn restore(&self, backup: &Path, target: &Path) -> Result<()> {
        let is_backup = cami_fs::file_name_str(backup).starts_with(BACKUP_PREFIX);
        if !backup.is_dir() || !is_backup {
            return Err(Error::InvalidBackup {
                path: backup.to_path_buf(),
            });
        }

        if target.exists() {
            fs::remove_dir_all(target).map_err(|e| cami_fs::Error::io(target, e))?;
        }
        copy_dir(backup, target)?;
        info!(backup = %backup.display(), target = %target.display(), "Restored backup");
        Ok(())
    }

    /// Delete all but the `keep_recent` newest backups. Zero keeps the default.
    pub fn cleanup(&self, target: &Path, keep_recent: usize) -> Result<CleanupResult> {
        let keep = if keep_recent == 0 {
            DEFAULT_KEEP_RECENT
        } else {
            keep_recent
        };

        let mut backups = self.list(target)?;
        let stale = backups.split_off(keep.min(backups.len()));

        let mut result = CleanupResult {
            kept: backups.into_iter().map(|b| b.path).collect(),
            ..CleanupResult::default()
        };
        for backup in stale {
            fs::remove_dir_all(&backup.path).map_err(|e| cami_fs::Error::io(&backup.path, e))?;
            debug!(path = %backup.path.display(), "Removed backup");
            result.removed_count += 1;
            result.freed_bytes += backup.size_bytes;
        }
        Ok(result)
    }

    pub fn should_suggest_cleanup(&self, target: &Path) -> Result<bool> {
        Ok(self.list(target)?.len() >= CLEANUP_THRESHOLD)
    }
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `.cami-backup-<target name>-`
fn backup_prefix(target: &Path) -> String {
    format!("{BACKUP_PREFIX}{}-", cami_fs::file_name_str(target))
}

fn next_backup_path(target: &Path) -> Result<PathBuf> {
    let parent = parent_dir(target);
    let base = format!("{}{}", backup_prefix(target), Local::now().format(TIMESTAMP_FORMAT));

    let mut candidate = parent.join(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = parent.join(format!("{base}-{n}"));
        n += 1;
    }
    Ok(candidate)
}

/// Split `YYYYmmdd-HHMMSS[-N]` into a timestamp and collision sequence.
fn parse_stamp(stamp: &str) -> (Option<DateTime<Utc>>, u32) {
    let time = stamp.get(..TIMESTAMP_LEN).unwrap_or(stamp);
    let rest = stamp.get(TIMESTAMP_LEN..).unwrap_or("");
    let sequence = rest
        .strip_prefix('-')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let timestamp = NaiveDateTime::parse_from_str(time, TIMESTAMP_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc));
    (timestamp, sequence)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            cami_fs::Error::io(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::not_found("entry under", src))?;
        let dest = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| cami_fs::Error::io(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| cami_fs::Error::io(entry.path(), e))?;
        }
    }
    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
