//! Writing agents into a project's `.claude/agents` directory

use std::path::{Path, PathBuf};

use chrono::Utc;
use cami_fs::CamiPath;
use serde::Serialize;
use tracing::{info, warn};

use crate::agent::{AgentRecord, load_agents_from_sources};
use crate::config::Config;
use crate::manifest::{DeployedAgent, ProjectManifest, UNKNOWN_SOURCE};
use crate::normalize::UNMATCHED_PRIORITY;
use crate::report::{Breakdown, ItemStatus};
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Outcome of deploying one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "kebab-case")]
pub enum DeployStatus {
    Deployed,
    /// The file exists and overwrite was not requested
    Conflict,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployResult {
    pub agent: String,
    pub file: PathBuf,
    #[serde(flatten)]
    pub status: DeployStatus,
}

impl DeployResult {
    pub fn item_status(&self) -> ItemStatus {
        match &self.status {
            DeployStatus::Deployed => ItemStatus::Succeeded,
            DeployStatus::Conflict => ItemStatus::Skipped("file already exists".into()),
            DeployStatus::Failed(message) => ItemStatus::Failed(message.clone()),
        }
    }
}

/// Results of a batch deployment
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    pub project: PathBuf,
    pub results: Vec<DeployResult>,
    /// Whether the manifests were updated
    pub recorded: bool,
}

impl DeployReport {
    pub fn breakdown(&self) -> Breakdown {
        let statuses: Vec<_> = self.results.iter().map(DeployResult::item_status).collect();
        Breakdown::tally(&statuses)
    }
}

fn target_file(project: &Path, agent: &AgentRecord) -> PathBuf {
    project.join(CamiPath::AgentsDir).join(agent.file_name())
}

/// Write one agent into `project`.
pub fn deploy_agent(agent: &AgentRecord, project: &Path, overwrite: bool) -> DeployResult {
    let file = target_file(project, agent);
    let status = if file.exists() && !overwrite {
        DeployStatus::Conflict
    } else {
        match cami_fs::io::write_text(&file, &agent.render()) {
            Ok(()) => DeployStatus::Deployed,
            Err(e) => DeployStatus::Failed(e.to_string()),
        }
    };
    DeployResult {
        agent: agent.name.clone(),
        file,
        status,
    }
}

pub fn deploy_agents(agents: &[AgentRecord], project: &Path, overwrite: bool) -> Vec<DeployResult> {
    agents
        .iter()
        .map(|agent| deploy_agent(agent, project, overwrite))
        .collect()
}

/// Check that `path` is an existing directory.
pub fn validate_target(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::not_found("deploy target", path));
    }
    if !path.is_dir() {
        return Err(Error::InvalidInput(format!(
            "deploy target is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Names of agents whose file already exists in `project`.
pub fn check_conflicts(agents: &[AgentRecord], project: &Path) -> Vec<String> {
    agents
        .iter()
        .filter(|agent| target_file(project, agent).exists())
        .map(|agent| agent.name.clone())
        .collect()
}

/// The configured source whose path is the longest prefix of `file`.
fn attribute_source(config: &Config, file: &Path) -> (String, i32) {
    config
        .agent_sources
        .iter()
        .filter(|s| file.starts_with(&s.path))
        .max_by_key(|s| s.path.components().count())
        .map(|s| (s.name.clone(), s.priority))
        .unwrap_or_else(|| (UNKNOWN_SOURCE.to_string(), UNMATCHED_PRIORITY))
}

/// Deploy the named agents from the configured sources and record them in
/// the project and central manifests.
///
/// Unknown names are reported as failed items. The manifests are written
/// only if at least one agent was deployed; existing entries for other
/// agents are kept.
pub fn deploy_and_record(
    ws: &Workspace,
    names: &[String],
    project: &Path,
    overwrite: bool,
) -> Result<DeployReport> {
    validate_target(project)?;
    let config = ws.load_config()?;
    let available = load_agents_from_sources(&config.source_specs());

    let mut report = DeployReport {
        project: project.to_path_buf(),
        ..DeployReport::default()
    };
    let mut deployed = Vec::new();

    for name in names {
        let Some(found) = available.find(name) else {
            warn!(agent = %name, "Agent not found in any source");
            report.results.push(DeployResult {
                agent: name.clone(),
                file: PathBuf::new(),
                status: DeployStatus::Failed("agent not found in any source".into()),
            });
            continue;
        };

        let result = deploy_agent(&found.record, project, overwrite);
        if result.status == DeployStatus::Deployed {
            deployed.push(manifest_entry(&config, &found.record, &result.file));
        }
        report.results.push(result);
    }

    if deployed.is_empty() {
        return Ok(report);
    }

    let mut agents = match ws.manifests().read_project(project) {
        Ok(existing) => existing.agents,
        Err(Error::ManifestNotFound { .. }) => Vec::new(),
        Err(e) => return Err(e),
    };
    for entry in deployed {
        match agents.iter_mut().find(|a| a.name == entry.name) {
            Some(slot) => *slot = entry,
            None => agents.push(entry),
        }
    }

    ws.manifests()
        .record_deployment(project, &ProjectManifest::native(agents))?;
    report.recorded = true;
    info!(project = %project.display(), "Deployed {} agent(s)", report.breakdown().succeeded);
    Ok(report)
}

fn manifest_entry(config: &Config, record: &AgentRecord, written: &Path) -> DeployedAgent {
    let (source, priority) = attribute_source(config, &record.file_path);
    DeployedAgent {
        name: record.name.clone(),
        version: record.version.clone(),
        source,
        source_path: record.file_path.to_string_lossy().into_owned(),
        priority,
        deployed_at: Utc::now(),
        content_hash: cami_fs::checksum::content_hash_file(written).unwrap_or_default(),
        metadata_hash: cami_fs::checksum::metadata_hash_file(written).unwrap_or_default(),
        custom_override: false,
        needs_upgrade: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentSource;
    use cami_fs::WorkspaceLayout;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn record(name: &str, version: &str) -> AgentRecord {
        AgentRecord {
            name: name.into(),
            version: version.into(),
            description: format!("{name} agent"),
            category: String::new(),
            file_path: PathBuf::from(format!("/sources/team/{name}.md")),
            extra_frontmatter: String::new(),
            body: "Body\n".into(),
        }
    }

    #[test]
    fn test_deploy_agent_writes_rendered_file() {
        let temp = TempDir::new().unwrap();
        let result = deploy_agent(&record("frontend", "1.0.0"), temp.path(), false);

        assert_eq!(result.status, DeployStatus::Deployed);
        let written = fs::read_to_string(temp.path().join(".claude/agents/frontend.md")).unwrap();
        assert!(written.starts_with("---\nname: frontend\nversion: 1.0.0\n"));
    }

    #[test]
    fn test_conflict_without_overwrite_leaves_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join(".claude/agents/frontend.md");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "local edits").unwrap();

        let result = deploy_agent(&record("frontend", "1.0.0"), temp.path(), false);
        assert_eq!(result.status, DeployStatus::Conflict);
        assert_eq!(fs::read_to_string(&file).unwrap(), "local edits");

        assert_eq!(check_conflicts(&[record("frontend", "1")], temp.path()), vec!["frontend"]);

        let result = deploy_agent(&record("frontend", "1.0.0"), temp.path(), true);
        assert_eq!(result.status, DeployStatus::Deployed);
        assert_ne!(fs::read_to_string(&file).unwrap(), "local edits");
    }

    #[test]
    fn test_validate_target() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(validate_target(temp.path()).is_ok());
        assert!(matches!(validate_target(&file), Err(Error::InvalidInput(_))));
        assert!(matches!(
            validate_target(&temp.path().join("absent")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_attribute_source_longest_prefix() {
        let mut config = Config::default();
        config.add_source(AgentSource::local("outer", "/sources", 10)).unwrap();
        config.add_source(AgentSource::local("inner", "/sources/team", 20)).unwrap();

        assert_eq!(
            attribute_source(&config, Path::new("/sources/team/a.md")),
            ("inner".to_string(), 20)
        );
        assert_eq!(
            attribute_source(&config, Path::new("/elsewhere/a.md")),
            ("unknown".to_string(), UNMATCHED_PRIORITY)
        );
    }

    #[test]
    fn test_deploy_and_record() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::open(WorkspaceLayout::at(temp.path().join("ws")));
        let source = temp.path().join("ws/sources/team");
        let project = temp.path().join("project");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&project).unwrap();
        fs::write(
            source.join("api.md"),
            "---\nname: api\nversion: 2.0.0\nmodel: sonnet\ntools: [Read]\n---\nAPI\n",
        )
        .unwrap();
        ws.config()
            .update(|c| c.add_source(AgentSource::local("team", &source, 100)))
            .unwrap();

        let report = deploy_and_record(&ws, &["api".into(), "ghost".into()], &project, false).unwrap();

        assert!(report.recorded);
        let breakdown = report.breakdown();
        assert_eq!((breakdown.succeeded, breakdown.failed), (1, 1));

        let manifest = ws.manifests().read_project(&project).unwrap();
        assert_eq!(manifest.agents.len(), 1);
        assert_eq!(manifest.agents[0].source, "team");
        assert_eq!(manifest.agents[0].priority, 100);
        assert!(manifest.agents[0].content_hash.starts_with("sha256:"));
        assert_eq!(ws.manifests().read_central().unwrap().deployments.len(), 1);

        let deployed = fs::read_to_string(project.join(".claude/agents/api.md")).unwrap();
        assert!(deployed.contains("\nmodel: sonnet\ntools: [Read]\n---\nAPI\n"), "{deployed}");
    }
}
