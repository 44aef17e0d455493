//! Project state analysis
//!
//! Classifies a project by its `.claude/agents` directory and manifest, then
//! compares each deployed agent against the configured sources.

use std::path::{Path, PathBuf};

use cami_fs::CamiPath;
use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::{AggregateOutcome, load_agents, load_agents_from_sources};
use crate::config::AgentSource;
use crate::manifest::{ManifestStore, ProjectManifest, ProjectState};
use crate::{Error, Result};

/// The source an agent resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMatch {
    pub source: String,
    pub priority: i32,
    pub source_path: PathBuf,
    pub version: String,
}

/// One deployed agent as seen by the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAnalysis {
    pub name: String,
    pub has_version: bool,
    pub version: String,
    pub matched_source: Option<SourceMatch>,
    pub is_tracked: bool,
    pub needs_upgrade: bool,
    pub file_path: PathBuf,
    /// Empty when the file could not be hashed
    pub content_hash: String,
    pub metadata_hash: String,
}

/// Normalization levels worth applying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub minimal_required: bool,
    pub standard_recommended: bool,
    /// Always false: full normalization is not available
    pub full_optional: bool,
}

/// Result of [`analyze_project`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectAnalysis {
    pub path: PathBuf,
    pub state: ProjectState,
    pub has_agents_dir: bool,
    pub has_manifest: bool,
    pub agent_count: usize,
    pub agents: Vec<AgentAnalysis>,
    pub recommendations: Recommendations,
}

/// Classify a project and compare its agents with `sources`.
///
/// When several sources define the same agent, the highest priority source
/// is the match.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `project` does not exist.
pub fn analyze_project(project: &Path, sources: &[AgentSource]) -> Result<ProjectAnalysis> {
    if !project.exists() {
        return Err(Error::not_found("project path", project));
    }

    let mut analysis = ProjectAnalysis {
        path: project.to_path_buf(),
        state: ProjectState::NonCami,
        has_agents_dir: false,
        has_manifest: false,
        agent_count: 0,
        agents: Vec::new(),
        recommendations: Recommendations::default(),
    };

    let agents_dir = project.join(CamiPath::AgentsDir);
    if !agents_dir.is_dir() {
        return Ok(analysis);
    }
    analysis.has_agents_dir = true;

    let manifest = read_manifest_lenient(project);
    analysis.has_manifest = manifest.is_some();
    analysis.state = match &manifest {
        Some(Ok(m)) => m.state,
        _ => ProjectState::CamiAware,
    };
    let tracked = manifest.and_then(|m| m.ok());

    let deployed = load_agents(&agents_dir)?;
    let specs: Vec<_> = sources.iter().map(AgentSource::spec).collect();
    let available = load_agents_from_sources(&specs);

    analysis.agent_count = deployed.len();
    analysis.agents = deployed
        .into_iter()
        .map(|agent| {
            let content_hash = hash_or_empty(&agent.file_path, cami_fs::checksum::content_hash_file);
            let metadata_hash =
                hash_or_empty(&agent.file_path, cami_fs::checksum::metadata_hash_file);
            let matched_source = match_source(&available, &agent.name);
            AgentAnalysis {
                needs_upgrade: matched_source
                    .as_ref()
                    .is_some_and(|m| m.version != agent.version),
                is_tracked: tracked.as_ref().is_some_and(|m| m.tracks(&agent.name)),
                has_version: agent.is_versioned(),
                matched_source,
                content_hash,
                metadata_hash,
                name: agent.name,
                version: agent.version,
                file_path: agent.file_path,
            }
        })
        .collect();

    analysis.recommendations = Recommendations {
        minimal_required: !analysis.has_manifest,
        standard_recommended: analysis
            .agents
            .iter()
            .any(|a| !a.has_version || a.matched_source.is_none()),
        full_optional: false,
    };
    Ok(analysis)
}

/// `None` when no manifest file exists; `Some(Err)` when it is unreadable.
fn read_manifest_lenient(project: &Path) -> Option<Result<ProjectManifest>> {
    let path = ManifestStore::project_manifest_path(project);
    if !path.exists() {
        return None;
    }
    let parsed = cami_fs::DocumentStore::new()
        .load::<ProjectManifest>(&path)
        .map_err(Error::from);
    if let Err(e) = &parsed {
        warn!(path = %path.display(), error = %e, "Unreadable project manifest");
    }
    Some(parsed)
}

fn match_source(available: &AggregateOutcome, name: &str) -> Option<SourceMatch> {
    available.find(name).map(|winner| SourceMatch {
        source: winner.source.clone(),
        priority: winner.priority,
        source_path: winner.record.file_path.clone(),
        version: winner.record.version.clone(),
    })
}

fn hash_or_empty(path: &Path, hash: fn(&Path) -> cami_fs::Result<String>) -> String {
    hash(path).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "Could not hash agent");
        String::new()
    })
}
