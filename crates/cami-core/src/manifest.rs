//! Project and central deployment manifests
//!
//! Each project records its deployed agents in
//! `<project>/.claude/cami-manifest.yaml`. The workspace mirrors every
//! project's record in `<workspace>/deployments.yaml`, keyed by absolute
//! project path.
//!
//! Both documents are written whole, through locked atomic writes. The pair
//! is updated together by [`ManifestStore::record_deployment`] under the
//! workspace deployments lock.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use cami_fs::io::LockGuard;
use cami_fs::{CamiPath, DocumentStore, WorkspaceLayout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

/// Schema version written to both manifests
pub const MANIFEST_VERSION: &str = "2";

/// Central manifest format revision
pub const MANIFEST_FORMAT_VERSION: u32 = 2;

/// Source name for agents whose origin is unknown
pub const UNKNOWN_SOURCE: &str = "unknown";

/// How far a project has been brought under CAMI management
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectState {
    /// No `.claude/agents` directory
    NonCami,
    /// Agents directory without a manifest
    CamiAware,
    /// Manifest present
    CamiNative,
    /// Reserved for an older manifest format. Nothing detects it.
    CamiLegacy,
}

impl ProjectState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonCami => "non-cami",
            Self::CamiAware => "cami-aware",
            Self::CamiNative => "cami-native",
            Self::CamiLegacy => "cami-legacy",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An agent as recorded in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedAgent {
    pub name: String,
    pub version: String,
    pub source: String,
    pub source_path: String,
    pub priority: i32,
    pub deployed_at: DateTime<Utc>,
    pub content_hash: String,
    pub metadata_hash: String,
    pub custom_override: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_upgrade: bool,
}

/// Per-project manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub version: String,
    pub state: ProjectState,
    pub normalized_at: DateTime<Utc>,
    #[serde(default)]
    pub agents: Vec<DeployedAgent>,
}

impl ProjectManifest {
    /// A CAMI-native manifest stamped now.
    pub fn native(agents: Vec<DeployedAgent>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            state: ProjectState::CamiNative,
            normalized_at: Utc::now(),
            agents,
        }
    }

    pub fn tracks(&self, name: &str) -> bool {
        self.agents.iter().any(|a| a.name == name)
    }
}

/// One project's entry in the central manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDeployment {
    pub state: ProjectState,
    pub normalized_at: DateTime<Utc>,
    pub last_scanned: DateTime<Utc>,
    #[serde(default)]
    pub agents: Vec<DeployedAgent>,
}

/// Workspace-wide record of every managed project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralManifest {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub manifest_format_version: u32,
    /// Keyed by absolute project path
    #[serde(default)]
    pub deployments: BTreeMap<String, ProjectDeployment>,
}

impl CentralManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            last_updated: Utc::now(),
            manifest_format_version: MANIFEST_FORMAT_VERSION,
            deployments: BTreeMap::new(),
        }
    }
}

/// Reads and writes the project and central manifests of one workspace
#[derive(Debug, Clone)]
pub struct ManifestStore {
    layout: WorkspaceLayout,
    documents: DocumentStore,
}

impl ManifestStore {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self {
            layout,
            documents: DocumentStore::new(),
        }
    }

    pub fn project_manifest_path(project: &Path) -> PathBuf {
        project.join(CamiPath::ProjectManifest)
    }

    /// Read a project's manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when the project has none.
    pub fn read_project(&self, project: &Path) -> Result<ProjectManifest> {
        let path = Self::project_manifest_path(project);
        self.documents
            .load_optional(&path)?
            .ok_or(Error::ManifestNotFound { path })
    }

    /// Overwrite a project's manifest, creating `.claude/` if needed.
    pub fn write_project(&self, project: &Path, manifest: &ProjectManifest) -> Result<()> {
        let path = Self::project_manifest_path(project);
        self.documents.save(&path, manifest)?;
        info!(path = %path.display(), agents = manifest.agents.len(), "Wrote project manifest");
        Ok(())
    }

    /// Read the central manifest, or an empty one if none exists yet.
    pub fn read_central(&self) -> Result<CentralManifest> {
        Ok(self
            .documents
            .load_optional(&self.layout.central_manifest_path())?
            .unwrap_or_else(CentralManifest::empty))
    }

    /// Stamp `last_updated` and overwrite the central manifest.
    pub fn write_central(&self, manifest: &mut CentralManifest) -> Result<()> {
        manifest.last_updated = Utc::now();
        self.documents
            .save(&self.layout.central_manifest_path(), manifest)?;
        Ok(())
    }

    /// Write the project manifest and upsert its central entry.
    ///
    /// Runs under the workspace deployments lock. Safe to repeat: re-running
    /// after an interruption between the two writes brings them back in step.
    pub fn record_deployment(&self, project: &Path, manifest: &ProjectManifest) -> Result<()> {
        let _lock = LockGuard::acquire(
            &self.layout.deployments_lock_path(),
            self.documents.robustness(),
        )?;

        self.write_project(project, manifest)?;

        let key = cami_fs::absolute_path(project)?
            .to_string_lossy()
            .into_owned();
        let mut central = self.read_central()?;
        central.deployments.insert(
            key.clone(),
            ProjectDeployment {
                state: manifest.state,
                normalized_at: manifest.normalized_at,
                last_scanned: Utc::now(),
                agents: manifest.agents.clone(),
            },
        );
        self.write_central(&mut central)?;
        info!(project = %key, "Recorded deployment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, ManifestStore, PathBuf) {
        let temp = TempDir::new().unwrap();
        let store = ManifestStore::new(WorkspaceLayout::at(temp.path().join("workspace")));
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        (temp, store, project)
    }

    fn agent(name: &str) -> DeployedAgent {
        DeployedAgent {
            name: name.into(),
            version: "1.0.0".into(),
            source: UNKNOWN_SOURCE.into(),
            source_path: String::new(),
            priority: 0,
            deployed_at: Utc::now(),
            content_hash: "sha256:abc".into(),
            metadata_hash: "sha256:def".into(),
            custom_override: false,
            needs_upgrade: false,
        }
    }

    #[test]
    fn test_read_project_missing_is_manifest_not_found() {
        let (_temp, store, project) = setup_test_store();
        let err = store.read_project(&project).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
        assert!(!ManifestStore::project_manifest_path(&project).exists());
    }

    #[test]
    fn test_project_roundtrip_and_state_spelling() {
        let (_temp, store, project) = setup_test_store();
        let manifest = ProjectManifest::native(vec![agent("frontend")]);

        store.write_project(&project, &manifest).unwrap();
        assert_eq!(store.read_project(&project).unwrap(), manifest);

        let text = fs::read_to_string(ManifestStore::project_manifest_path(&project)).unwrap();
        assert!(text.contains("state: cami-native"), "got: {text}");
        assert!(!text.contains("needs_upgrade"), "false flag must be omitted: {text}");
    }

    #[test]
    fn test_read_central_absent_is_empty() {
        let (_temp, store, _project) = setup_test_store();
        let central = store.read_central().unwrap();
        assert_eq!(central.version, "2");
        assert_eq!(central.manifest_format_version, 2);
        assert!(central.deployments.is_empty());
    }

    #[test]
    fn test_write_central_advances_last_updated() {
        let (_temp, store, _project) = setup_test_store();
        let mut central = CentralManifest::empty();
        let stale = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        central.last_updated = stale;

        store.write_central(&mut central).unwrap();
        assert!(central.last_updated > stale);
        assert_eq!(store.read_central().unwrap().last_updated, central.last_updated);
    }

    #[test]
    fn test_corrupt_central_reports_path() {
        let (temp, store, _project) = setup_test_store();
        let path = temp.path().join("workspace/deployments.yaml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "deployments: [not: a map").unwrap();

        let err = store.read_central().unwrap_err();
        assert!(err.to_string().contains("deployments.yaml"), "got: {err}");
    }

    #[test]
    fn test_record_deployment_upserts_by_absolute_path() {
        let (_temp, store, project) = setup_test_store();

        store
            .record_deployment(&project, &ProjectManifest::native(vec![agent("a")]))
            .unwrap();
        store
            .record_deployment(&project, &ProjectManifest::native(vec![agent("a"), agent("b")]))
            .unwrap();

        let central = store.read_central().unwrap();
        assert_eq!(central.deployments.len(), 1);

        let key = cami_fs::absolute_path(&project).unwrap();
        let entry = &central.deployments[key.to_string_lossy().as_ref()];
        assert_eq!(entry.agents.len(), 2);
        assert_eq!(entry.state, ProjectState::CamiNative);
        assert_eq!(store.read_project(&project).unwrap().agents.len(), 2);
    }
}
