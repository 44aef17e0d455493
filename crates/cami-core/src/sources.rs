//! Agent source management: add, list, update, status and remove
//!
//! Git-backed sources live under `<workspace>/sources/<name>`. Removing a
//! source only edits the configuration; files on disk are left alone.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::agent::load_agents;
use crate::config::{AgentSource, GitConfig};
use crate::git::PullOutcome;
use crate::report::{Breakdown, ItemStatus};
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Priority given to a new source when none is requested
pub const DEFAULT_SOURCE_PRIORITY: i32 = 50;

/// Source name from a git URL: the last path segment without `.git`.
///
/// `git@github.com:org/agents.git` and `https://host/org/agents` both give
/// `agents`; a bare `host:agents.git` gives `agents` too.
pub fn derive_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.rsplit(':').next().unwrap_or(last).to_string()
}

/// A newly cloned and registered source
#[derive(Debug, Clone, Serialize)]
pub struct AddedSource {
    pub source: AgentSource,
    pub agent_count: usize,
}

/// Clone `url` into the sources directory and register it.
///
/// The name defaults to [`derive_name_from_url`] and the priority to
/// [`DEFAULT_SOURCE_PRIORITY`].
///
/// # Errors
///
/// - [`Error::Conflict`] if the name is taken or the target directory exists
/// - [`Error::Git`] if the clone fails; nothing is registered then
pub fn add_source(
    ws: &Workspace,
    url: &str,
    name: Option<&str>,
    priority: Option<i32>,
) -> Result<AddedSource> {
    let name = name.map_or_else(|| derive_name_from_url(url), str::to_string);
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("cannot derive a source name from '{url}'")));
    }
    let priority = priority.unwrap_or(DEFAULT_SOURCE_PRIORITY);

    if ws.load_config()?.get_source(&name).is_ok() {
        return Err(Error::Conflict(format!("source '{name}' already exists")));
    }

    let sources_dir = ws.layout().sources_dir();
    let target = sources_dir.join(&name);
    if target.exists() {
        return Err(Error::Conflict(format!(
            "directory already exists: {}",
            target.display()
        )));
    }
    std::fs::create_dir_all(&sources_dir).map_err(|e| cami_fs::Error::io(&sources_dir, e))?;

    info!(%url, source = %name, "Cloning source");
    ws.git().clone_repo(url, &target)?;

    let agent_count = match load_agents(&target) {
        Ok(agents) => agents.len(),
        Err(e) => {
            warn!(source = %name, error = %e, "Cloned source has no readable agents");
            0
        }
    };

    let source = AgentSource::local(&name, &target, priority).with_git(GitConfig {
        enabled: true,
        remote: Some(url.to_string()),
    });
    ws.config().update(|config| config.add_source(source.clone()))?;
    info!(source = %name, priority, agents = agent_count, "Added source");

    Ok(AddedSource { source, agent_count })
}

/// A configured source with its current agent count
#[derive(Debug, Clone, Serialize)]
pub struct SourceListing {
    #[serde(flatten)]
    pub source: AgentSource,
    /// `None` when the directory could not be read
    pub agent_count: Option<usize>,
}

/// Configured sources in config order.
pub fn list_sources(ws: &Workspace) -> Result<Vec<SourceListing>> {
    Ok(ws
        .load_config()?
        .agent_sources
        .into_iter()
        .map(|source| {
            let agent_count = load_agents(&source.path).map(|a| a.len()).ok();
            SourceListing { source, agent_count }
        })
        .collect())
}

/// Result of updating one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceUpdate {
    pub name: String,
    #[serde(flatten)]
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PullOutcome>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub sources: Vec<SourceUpdate>,
}

impl UpdateReport {
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::tally(self.sources.iter().map(|s| &s.status))
    }
}

/// `git pull` every git-enabled source, or only `only`.
///
/// Sources without git are skipped. A failed pull is recorded and the
/// remaining sources still run.
///
/// # Errors
///
/// [`Error::NotFound`] if `only` names no configured source.
pub fn update_sources(ws: &Workspace, only: Option<&str>) -> Result<UpdateReport> {
    let config = ws.load_config()?;
    if let Some(name) = only {
        config.get_source(name)?;
    }

    let mut report = UpdateReport::default();
    for source in config
        .agent_sources
        .iter()
        .filter(|s| only.is_none_or(|name| s.name == name))
    {
        let update = if !source.is_git() {
            SourceUpdate {
                name: source.name.clone(),
                status: ItemStatus::Skipped("no git remote".to_string()),
                outcome: None,
            }
        } else {
            match ws.git().pull(&source.path) {
                Ok(outcome) => {
                    info!(source = %source.name, ?outcome, "Pulled source");
                    SourceUpdate {
                        name: source.name.clone(),
                        status: ItemStatus::Succeeded,
                        outcome: Some(outcome),
                    }
                }
                Err(e) => {
                    warn!(source = %source.name, error = %e, "Failed to update source");
                    SourceUpdate {
                        name: source.name.clone(),
                        status: ItemStatus::Failed(e.to_string()),
                        outcome: None,
                    }
                }
            }
        };
        report.sources.push(update);
    }
    Ok(report)
}

/// Working tree state of a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "kebab-case")]
pub enum GitState {
    NotEnabled,
    Clean,
    /// Lines of `git status --porcelain`
    Dirty(Vec<String>),
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub path: PathBuf,
    pub git: GitState,
}

/// Git working tree state of every configured source.
pub fn source_status(ws: &Workspace) -> Result<Vec<SourceStatus>> {
    Ok(ws
        .load_config()?
        .agent_sources
        .into_iter()
        .map(|source| {
            let git = if !source.is_git() {
                GitState::NotEnabled
            } else {
                match ws.git().status_porcelain(&source.path) {
                    Ok(lines) if lines.is_empty() => GitState::Clean,
                    Ok(lines) => GitState::Dirty(lines),
                    Err(e) => GitState::Error(e.to_string()),
                }
            };
            SourceStatus {
                name: source.name,
                path: source.path,
                git,
            }
        })
        .collect())
}

/// Unregister a source. Its directory stays on disk.
pub fn remove_source(ws: &Workspace, name: &str) -> Result<AgentSource> {
    let removed = ws.config().update(|config| config.remove_source(name))?;
    info!(source = %name, "Removed source from config");
    Ok(removed)
}
