//! Deploy location scanning and project discovery

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cami_fs::CamiPath;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::agent::{AgentRecord, load_agents, parse_agent_file};
use crate::config::DeployLocation;
use crate::report::{Breakdown, ItemStatus};
use crate::{Error, Result};

/// Directories never searched for projects
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "dist",
    "build",
    ".next",
    ".venv",
    "__pycache__",
    "target",
    ".cache",
];

/// Where an available agent stands at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStatus {
    UpToDate,
    UpdateAvailable,
    NotDeployed,
}

impl DeploymentStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::UpToDate => "✓",
            Self::UpdateAvailable => "⚠",
            Self::NotDeployed => "○",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    pub name: String,
    /// Empty when not deployed
    pub deployed_version: String,
    pub available_version: String,
    pub status: DeploymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationStatus {
    pub location: DeployLocation,
    pub agents: Vec<AgentStatus>,
    pub last_scanned: DateTime<Utc>,
}

/// Results of scanning every configured location
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub locations: Vec<LocationStatus>,
    pub failed: Vec<(String, String)>,
}

impl ScanReport {
    pub fn breakdown(&self) -> Breakdown {
        let statuses: Vec<_> = self
            .locations
            .iter()
            .map(|_| ItemStatus::Succeeded)
            .chain(self.failed.iter().map(|(_, m)| ItemStatus::Failed(m.clone())))
            .collect();
        Breakdown::tally(&statuses)
    }
}

/// Compare the agents deployed at `location` with those `available`.
pub fn scan_location(location: &DeployLocation, available: &[AgentRecord]) -> Result<LocationStatus> {
    let agents_dir = location.path.join(CamiPath::AgentsDir);
    let deployed = if agents_dir.is_dir() {
        deployed_agents(&agents_dir)?
    } else {
        Vec::new()
    };

    let agents = available
        .iter()
        .map(|agent| {
            let found = deployed.iter().find(|d| d.name == agent.name);
            let status = match found {
                None => DeploymentStatus::NotDeployed,
                Some(d) if d.version == agent.version => DeploymentStatus::UpToDate,
                Some(_) => DeploymentStatus::UpdateAvailable,
            };
            AgentStatus {
                name: agent.name.clone(),
                deployed_version: found.map(|d| d.version.clone()).unwrap_or_default(),
                available_version: agent.version.clone(),
                status,
            }
        })
        .collect();

    Ok(LocationStatus {
        location: location.clone(),
        agents,
        last_scanned: Utc::now(),
    })
}

/// Top-level agent files of a deployed agents directory, by file name.
pub(crate) fn deployed_agents(agents_dir: &Path) -> Result<Vec<AgentRecord>> {
    let entries = std::fs::read_dir(agents_dir).map_err(|e| cami_fs::Error::io(agents_dir, e))?;
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    Ok(paths
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|p| match parse_agent_file(&p) {
            Ok(agent) => Some(agent),
            Err(e) => {
                debug!(path = %p.display(), error = %e, "Skipping deployed file");
                None
            }
        })
        .collect())
}

/// Scan every location. A location that cannot be read is reported as failed.
pub fn scan_all_locations(locations: &[DeployLocation], available: &[AgentRecord]) -> ScanReport {
    let mut report = ScanReport::default();
    for location in locations {
        match scan_location(location, available) {
            Ok(status) => report.locations.push(status),
            Err(e) => {
                warn!(location = %location.name, error = %e, "Failed to scan location");
                report.failed.push((location.name.clone(), e.to_string()));
            }
        }
    }
    report
}

/// Filters for [`discover_projects`]
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    pub root: PathBuf,
    /// Only projects with a `.claude` directory but no agents
    pub empty_only: bool,
    /// Only projects that have this agent deployed
    pub has_agent: Option<String>,
    /// Deepest project directory below the root; 0 for unlimited
    pub max_depth: usize,
}

/// A directory containing `.claude/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<PathBuf>,
    pub has_agents: bool,
    pub agent_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
}

/// Find Claude projects below `options.root`.
///
/// Dependency, build and VCS directories listed in [`SKIP_DIRS`] are not
/// entered. Unreadable directories are skipped.
pub fn discover_projects(options: &DiscoverOptions) -> Result<Vec<ProjectInfo>> {
    let root = cami_fs::absolute_path(&options.root)?;
    if !root.is_dir() {
        return Err(Error::not_found("path", &root));
    }

    let mut projects = Vec::new();
    let mut walker = WalkDir::new(&root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();

        if name == CamiPath::ClaudeDir.as_str() {
            walker.skip_current_dir();
            let Some(project) = entry.path().parent() else {
                continue;
            };
            let depth = entry.depth().saturating_sub(1);
            if options.max_depth > 0 && depth > options.max_depth {
                continue;
            }
            let info = scan_project(project, &root);
            if options.empty_only && info.has_agents {
                continue;
            }
            if let Some(wanted) = &options.has_agent
                && !info.agents.contains(wanted)
            {
                continue;
            }
            projects.push(info);
        } else if entry.depth() > 0 && SKIP_DIRS.contains(&&*name) {
            walker.skip_current_dir();
        }
    }

    Ok(projects)
}

fn scan_project(project: &Path, root: &Path) -> ProjectInfo {
    let relative_path = project
        .strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf);

    let agents_dir = project.join(CamiPath::AgentsDir);
    let agents: Vec<String> = if agents_dir.is_dir() {
        load_agents(&agents_dir)
            .map(|agents| agents.into_iter().map(|a| a.name).collect())
            .unwrap_or_else(|e| {
                warn!(project = %project.display(), error = %e, "Failed to load agents");
                Vec::new()
            })
    } else {
        Vec::new()
    };

    ProjectInfo {
        path: project.to_path_buf(),
        relative_path,
        has_agents: !agents.is_empty(),
        agent_count: agents.len(),
        agents,
    }
}
