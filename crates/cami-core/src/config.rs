//! Workspace configuration: agent sources and deploy locations
//!
//! Stored as YAML at `<workspace>/config.yaml`. A missing file reads as an
//! empty version "1" configuration.

use std::path::{Path, PathBuf};

use cami_fs::DocumentStore;
use cami_fs::io::LockGuard;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::SourceSpec;
use crate::{Error, Result};

/// Current config schema version
pub const CONFIG_VERSION: &str = "1";

/// Only supported source type
pub const SOURCE_TYPE_LOCAL: &str = "local";

/// Git settings of a source cloned from a remote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// A directory of agents registered in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSource {
    pub name: String,
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    pub path: PathBuf,
    /// Higher number wins on name conflict
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitConfig>,
}

fn default_source_type() -> String {
    SOURCE_TYPE_LOCAL.to_string()
}

impl AgentSource {
    pub fn local(name: impl Into<String>, path: impl Into<PathBuf>, priority: i32) -> Self {
        Self {
            name: name.into(),
            source_type: default_source_type(),
            path: path.into(),
            priority,
            git: None,
        }
    }

    pub fn with_git(mut self, git: GitConfig) -> Self {
        self.git = Some(git);
        self
    }

    pub fn is_git(&self) -> bool {
        self.git.as_ref().is_some_and(|g| g.enabled)
    }

    pub fn spec(&self) -> SourceSpec {
        SourceSpec::named(&self.name, &self.path, self.priority)
    }
}

/// A directory agents are deployed into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployLocation {
    pub name: String,
    pub path: PathBuf,
}

/// The workspace configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub agent_sources: Vec<AgentSource>,
    #[serde(default)]
    pub deploy_locations: Vec<DeployLocation>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            agent_sources: Vec::new(),
            deploy_locations: Vec::new(),
        }
    }
}

impl Config {
    /// Register a source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if a source with the same name exists.
    pub fn add_source(&mut self, source: AgentSource) -> Result<()> {
        if self.agent_sources.iter().any(|s| s.name == source.name) {
            return Err(Error::Conflict(format!(
                "source with name '{}' already exists",
                source.name
            )));
        }
        self.agent_sources.push(source);
        Ok(())
    }

    /// Remove a source from the configuration. Files on disk are untouched.
    pub fn remove_source(&mut self, name: &str) -> Result<AgentSource> {
        let index = self
            .agent_sources
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| Error::NotFound(format!("source '{name}'")))?;
        Ok(self.agent_sources.remove(index))
    }

    pub fn get_source(&self, name: &str) -> Result<&AgentSource> {
        self.agent_sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::NotFound(format!("source '{name}'")))
    }

    /// Sources as aggregation inputs, in config order.
    pub fn source_specs(&self) -> Vec<SourceSpec> {
        self.agent_sources.iter().map(AgentSource::spec).collect()
    }

    /// Register a deploy location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] on a duplicate name or path and
    /// [`Error::NotFound`] when the path does not exist.
    pub fn add_location(&mut self, name: &str, path: &Path) -> Result<()> {
        for location in &self.deploy_locations {
            if location.name == name {
                return Err(Error::Conflict(format!(
                    "location with name '{name}' already exists"
                )));
            }
            if location.path == path {
                return Err(Error::Conflict(format!(
                    "location with path '{}' already exists",
                    path.display()
                )));
            }
        }
        if !path.exists() {
            return Err(Error::not_found("path", path));
        }
        self.deploy_locations.push(DeployLocation {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    pub fn remove_location(&mut self, name: &str) -> Result<DeployLocation> {
        let index = self
            .deploy_locations
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| Error::NotFound(format!("location '{name}'")))?;
        Ok(self.deploy_locations.remove(index))
    }
}

/// Pre-YAML configuration format, which only held deploy locations
#[derive(Debug, Deserialize)]
struct LegacyConfig {
    #[serde(default)]
    deploy_locations: Vec<DeployLocation>,
}

/// Reads and writes the workspace `config.yaml`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    documents: DocumentStore,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            documents: DocumentStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, or an empty one if the file does not exist.
    pub fn load(&self) -> Result<Config> {
        Ok(self.documents.load_optional(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        self.documents.save(&self.path, config)?;
        info!(path = %self.path.display(), "Saved config");
        Ok(())
    }

    /// Lock file beside the config, e.g. `config.yaml.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut lock = self.path.as_os_str().to_owned();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn lock(&self) -> Result<LockGuard> {
        Ok(LockGuard::acquire(&self.lock_path(), self.documents.robustness())?)
    }

    /// Load, apply `change`, and save, holding the config lock throughout.
    /// Nothing is written when `change` fails.
    pub fn update<T>(&self, change: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut config = self.load()?;
        let value = change(&mut config)?;
        self.save(&config)?;
        Ok(value)
    }

    /// Import deploy locations from a legacy JSON config.
    ///
    /// Does nothing when the YAML config already exists or the legacy file is
    /// absent. On success the legacy file is renamed with a `.backup` suffix.
    /// Returns whether a migration happened.
    pub fn migrate_legacy(&self, legacy_path: &Path) -> Result<bool> {
        let _lock = self.lock()?;
        if self.path.exists() || !legacy_path.exists() {
            return Ok(false);
        }

        let legacy: LegacyConfig = self.documents.load(legacy_path)?;
        let config = Config {
            deploy_locations: legacy.deploy_locations,
            ..Config::default()
        };
        self.save(&config)?;

        let mut backup = legacy_path.as_os_str().to_owned();
        backup.push(".backup");
        std::fs::rename(legacy_path, &backup).map_err(|e| cami_fs::Error::io(legacy_path, e))?;
        info!(from = %legacy_path.display(), "Migrated legacy config");
        Ok(true)
    }
}
