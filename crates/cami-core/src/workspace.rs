//! The workspace context passed to every operation that touches config or
//! manifests.

use std::path::Path;

use cami_fs::WorkspaceLayout;
use tracing::info;

use crate::Result;
use crate::config::{Config, ConfigStore};
use crate::git::GitClient;
use crate::manifest::ManifestStore;

/// Stores and tools bound to one workspace root
#[derive(Debug, Clone)]
pub struct Workspace {
    layout: WorkspaceLayout,
    config: ConfigStore,
    manifests: ManifestStore,
    git: GitClient,
}

impl Workspace {
    pub fn open(layout: WorkspaceLayout) -> Self {
        Self {
            config: ConfigStore::new(layout.config_path()),
            manifests: ManifestStore::new(layout.clone()),
            git: GitClient::new(),
            layout,
        }
    }

    /// Open the workspace at `explicit`, `$CAMI_WORKSPACE`, or the default.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Ok(Self::open(WorkspaceLayout::resolve(explicit)?))
    }

    pub fn with_git(mut self, git: GitClient) -> Self {
        self.git = git;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn manifests(&self) -> &ManifestStore {
        &self.manifests
    }

    pub fn git(&self) -> &GitClient {
        &self.git
    }

    /// Shorthand for loading the configuration.
    pub fn load_config(&self) -> Result<Config> {
        self.config.load()
    }

    /// Create the workspace directories and an empty config.
    ///
    /// Returns `false` when a config already existed. Existing files are never
    /// overwritten.
    pub fn init(&self) -> Result<bool> {
        let sources = self.layout.sources_dir();
        std::fs::create_dir_all(&sources).map_err(|e| cami_fs::Error::io(&sources, e))?;

        if self.config.path().exists() {
            return Ok(false);
        }
        self.config.save(&Config::default())?;
        info!(root = %self.root().display(), "Initialized workspace");
        Ok(true)
    }
}
