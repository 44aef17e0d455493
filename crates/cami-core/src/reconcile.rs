//! Reconciling `<workspace>/sources` with the configured sources
//!
//! Directories under `sources/` that no configured source points at are
//! *untracked*; configured sources whose path is gone are *orphaned*.
//! Fixing registers untracked directories. Orphans are reported only.

use std::collections::HashSet;
use std::path::PathBuf;

use cami_fs::CamiPath;
use serde::Serialize;
use tracing::{info, warn};

use crate::agent::load_agents;
use crate::config::{AgentSource, GitConfig};
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Priority given to sources registered by reconciliation
pub const RECONCILED_PRIORITY: i32 = 50;

/// A source directory missing from the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UntrackedSource {
    pub name: String,
    pub path: PathBuf,
    pub agent_count: usize,
    pub has_git: bool,
    pub git_remote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub untracked: Vec<UntrackedSource>,
    /// Names of configured sources whose path does not exist
    pub orphaned: Vec<String>,
    pub total_on_disk: usize,
    pub total_in_config: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty() && self.orphaned.is_empty()
    }
}

/// What [`apply_fix`] should register
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixMode {
    CheckOnly,
    Auto,
    Manual(Vec<String>),
}

/// Compare the sources directory with the configuration.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the workspace has no sources directory.
pub fn reconcile(ws: &Workspace) -> Result<ReconcileReport> {
    let config = ws.load_config()?;
    let sources_dir = ws.layout().sources_dir();
    if !sources_dir.is_dir() {
        return Err(Error::not_found("sources directory", &sources_dir));
    }

    let configured_paths: HashSet<PathBuf> = config
        .agent_sources
        .iter()
        .filter_map(|s| cami_fs::absolute_path(&s.path).ok())
        .collect();
    let configured_names: HashSet<&str> =
        config.agent_sources.iter().map(|s| s.name.as_str()).collect();

    let mut entries: Vec<_> = std::fs::read_dir(&sources_dir)
        .map_err(|e| cami_fs::Error::io(&sources_dir, e))?
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut report = ReconcileReport {
        total_on_disk: entries.len(),
        total_in_config: config.agent_sources.len(),
        ..ReconcileReport::default()
    };

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let tracked = cami_fs::absolute_path(&path).is_ok_and(|abs| configured_paths.contains(&abs))
            || configured_names.contains(name.as_str());
        if tracked {
            continue;
        }
        report.untracked.push(inspect(ws, name, path));
    }

    report.orphaned = config
        .agent_sources
        .iter()
        .filter(|s| !s.path.exists())
        .map(|s| s.name.clone())
        .collect();

    Ok(report)
}

fn inspect(ws: &Workspace, name: String, path: PathBuf) -> UntrackedSource {
    let agent_count = load_agents(&path).map(|a| a.len()).unwrap_or(0);
    let has_git = path.join(CamiPath::GitDir).exists();
    let git_remote = if has_git { ws.git().remote_url(&path) } else { None };
    UntrackedSource {
        name,
        path,
        agent_count,
        has_git,
        git_remote,
    }
}

/// Register untracked sources from `report` according to `mode`.
///
/// Returns the names added. Names that now clash with a configured source
/// are skipped with a warning. Orphans are never removed.
pub fn apply_fix(ws: &Workspace, report: &ReconcileReport, mode: &FixMode) -> Result<Vec<String>> {
    let selected: Vec<&UntrackedSource> = match mode {
        FixMode::CheckOnly => return Ok(Vec::new()),
        FixMode::Auto => report.untracked.iter().collect(),
        FixMode::Manual(names) => report
            .untracked
            .iter()
            .filter(|u| names.contains(&u.name))
            .collect(),
    };
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    ws.config().update(|config| {
        let mut added = Vec::new();
        for untracked in selected {
            match config.add_source(registration(untracked)) {
                Ok(()) => {
                    info!(source = %untracked.name, "Registered untracked source");
                    added.push(untracked.name.clone());
                }
                Err(e) => warn!(source = %untracked.name, error = %e, "Skipping source"),
            }
        }
        Ok(added)
    })
}

fn registration(untracked: &UntrackedSource) -> AgentSource {
    let source = AgentSource::local(&untracked.name, &untracked.path, RECONCILED_PRIORITY);
    if untracked.has_git {
        source.with_git(GitConfig {
            enabled: true,
            remote: untracked.git_remote.clone(),
        })
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cami_fs::WorkspaceLayout;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_workspace(on_disk: &[&str], configured: &[&str]) -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::open(WorkspaceLayout::at(temp.path()));
        ws.init().unwrap();

        for name in on_disk {
            let dir = ws.layout().sources_dir().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("agent.md"), format!("---\nname: {name}-agent\n---\n")).unwrap();
        }
        ws.config()
            .update(|c| {
                for name in configured {
                    let path = ws.layout().sources_dir().join(name);
                    c.add_source(AgentSource::local(*name, path, 100))?;
                }
                Ok(())
            })
            .unwrap();
        (temp, ws)
    }

    #[test]
    fn test_untracked_detected() {
        let (_temp, ws) = setup_test_workspace(&["a", "b", "c"], &["a"]);

        let report = reconcile(&ws).unwrap();

        let names: Vec<_> = report.untracked.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!(report.orphaned.is_empty());
        assert_eq!(report.total_on_disk, 3);
        assert_eq!(report.total_in_config, 1);
        assert_eq!(report.untracked[0].agent_count, 1);
        assert!(!report.untracked[0].has_git);
    }

    #[test]
    fn test_auto_fix_is_symmetric() {
        let (_temp, ws) = setup_test_workspace(&["a", "b", "c"], &["a"]);

        let report = reconcile(&ws).unwrap();
        let added = apply_fix(&ws, &report, &FixMode::Auto).unwrap();
        assert_eq!(added, vec!["b".to_string(), "c".to_string()]);

        let after = reconcile(&ws).unwrap();
        assert!(after.is_clean(), "{after:?}");

        let config = ws.load_config().unwrap();
        let b = config.get_source("b").unwrap();
        assert_eq!(b.priority, RECONCILED_PRIORITY);
        assert_eq!(b.source_type, "local");
        assert!(b.git.is_none());
    }

    #[test]
    fn test_check_only_mutates_nothing() {
        let (_temp, ws) = setup_test_workspace(&["a", "b"], &[]);
        let report = reconcile(&ws).unwrap();

        assert!(apply_fix(&ws, &report, &FixMode::CheckOnly).unwrap().is_empty());
        assert!(ws.load_config().unwrap().agent_sources.is_empty());
    }

    #[test]
    fn test_manual_fix_only_named() {
        let (_temp, ws) = setup_test_workspace(&["a", "b", "c"], &[]);
        let report = reconcile(&ws).unwrap();

        let added = apply_fix(&ws, &report, &FixMode::Manual(vec!["c".into(), "zzz".into()])).unwrap();
        assert_eq!(added, vec!["c".to_string()]);
        assert_eq!(reconcile(&ws).unwrap().untracked.len(), 2);
    }

    #[test]
    fn test_orphans_reported_not_removed() {
        let (_temp, ws) = setup_test_workspace(&["a"], &["a", "gone"]);

        let report = reconcile(&ws).unwrap();
        assert_eq!(report.orphaned, vec!["gone".to_string()]);

        apply_fix(&ws, &report, &FixMode::Auto).unwrap();
        assert!(ws.load_config().unwrap().get_source("gone").is_ok());
    }

    #[test]
    fn test_hidden_and_plain_files_ignored() {
        let (_temp, ws) = setup_test_workspace(&["a"], &["a"]);
        let sources = ws.layout().sources_dir();
        fs::create_dir_all(sources.join(".cami-backup-20250101-000000")).unwrap();
        fs::write(sources.join("README.md"), "notes").unwrap();

        let report = reconcile(&ws).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.total_on_disk, 1);
    }

    #[test]
    fn test_missing_sources_dir() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::open(WorkspaceLayout::at(temp.path().join("none")));
        assert!(matches!(reconcile(&ws), Err(Error::NotFound(_))));
    }
}
