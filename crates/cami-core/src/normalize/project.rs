//! Project normalization: bring a project's deployed agents under a manifest

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::after_backup;
use crate::backup::BackupManager;
use crate::config::AgentSource;
use crate::manifest::{
    DeployedAgent, ManifestStore, ProjectManifest, ProjectState, UNKNOWN_SOURCE,
};
use crate::project::{AgentAnalysis, analyze_project};
use crate::{Error, Result};

/// Priority recorded for agents no source provides
pub const UNMATCHED_PRIORITY: i32 = 999;

/// How much of a project to normalize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectNormalizationLevel {
    /// Manifests only, every agent attributed to an unknown source
    #[default]
    Minimal,
    /// Manifests with agents linked to their sources
    Standard,
    /// Reserved
    Full,
}

impl FromStr for ProjectNormalizationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            "full" => Ok(Self::Full),
            other => Err(Error::InvalidInput(format!(
                "unknown normalization level '{other}' (expected minimal, standard or full)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNormalizationOptions {
    pub level: ProjectNormalizationLevel,
    /// Agents left out of the manifest
    #[serde(default)]
    pub skip_agents: Vec<String>,
    /// Agents recorded as intentionally customized
    #[serde(default)]
    pub custom_overrides: Vec<String>,
}

impl ProjectNormalizationOptions {
    pub fn level(level: ProjectNormalizationLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectNormalizationResult {
    pub success: bool,
    pub state_before: ProjectState,
    pub state_after: ProjectState,
    pub changes: Vec<String>,
    pub backup_path: PathBuf,
    pub undo_available: bool,
}

/// Write a CAMI-native manifest for a project's deployed agents.
///
/// The project directory is backed up first. Both the project and central
/// manifests are updated.
///
/// # Errors
///
/// [`ProjectNormalizationLevel::Full`] fails with [`Error::NotImplemented`]
/// before any backup is taken.
pub fn normalize_project(
    store: &ManifestStore,
    project: &Path,
    options: &ProjectNormalizationOptions,
    sources: &[AgentSource],
) -> Result<ProjectNormalizationResult> {
    if options.level == ProjectNormalizationLevel::Full {
        return Err(Error::NotImplemented("full normalization".into()));
    }

    let analysis = analyze_project(project, sources)?;
    let backup_path = BackupManager::new().create(project)?;

    after_backup(&backup_path, || {
        let now = Utc::now();
        let agents = analysis
            .agents
            .iter()
            .filter(|a| !options.skip_agents.contains(&a.name))
            .map(|a| {
                let mut entry = match options.level {
                    ProjectNormalizationLevel::Standard => linked_entry(a),
                    _ => unknown_entry(a, 0),
                };
                entry.deployed_at = now;
                entry.custom_override = options.custom_overrides.contains(&a.name);
                entry
            })
            .collect();

        store.record_deployment(project, &ProjectManifest::native(agents))?;

        let change = match options.level {
            ProjectNormalizationLevel::Standard => "Created project manifest with source links",
            _ => "Created project manifest",
        };
        info!(project = %project.display(), level = ?options.level, "{change}");

        Ok(ProjectNormalizationResult {
            success: true,
            state_before: analysis.state,
            state_after: ProjectState::CamiNative,
            changes: vec![change.to_string()],
            backup_path: backup_path.clone(),
            undo_available: true,
        })
    })
}

fn unknown_entry(agent: &AgentAnalysis, priority: i32) -> DeployedAgent {
    DeployedAgent {
        name: agent.name.clone(),
        version: agent.version.clone(),
        source: UNKNOWN_SOURCE.to_string(),
        source_path: String::new(),
        priority,
        deployed_at: Utc::now(),
        content_hash: agent.content_hash.clone(),
        metadata_hash: agent.metadata_hash.clone(),
        custom_override: false,
        needs_upgrade: false,
    }
}

fn linked_entry(agent: &AgentAnalysis) -> DeployedAgent {
    match &agent.matched_source {
        Some(matched) => DeployedAgent {
            source: matched.source.clone(),
            source_path: matched.source_path.to_string_lossy().into_owned(),
            priority: matched.priority,
            needs_upgrade: agent.needs_upgrade,
            ..unknown_entry(agent, matched.priority)
        },
        None => unknown_entry(agent, UNMATCHED_PRIORITY),
    }
}
