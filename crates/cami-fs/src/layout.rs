//! Workspace layout resolution
//!
//! The CAMI workspace is a directory holding `config.yaml`, the central
//! `deployments.yaml` manifest and the `sources/` tree. It is resolved from an
//! explicit path, the `CAMI_WORKSPACE` environment variable, or
//! `~/cami-workspace`, in that order.

use std::path::{Path, PathBuf};

use crate::{CamiPath, Error, Result};

/// Environment variable overriding the workspace location
pub const WORKSPACE_ENV: &str = "CAMI_WORKSPACE";

/// Directory name of the default workspace under the home directory
pub const DEFAULT_WORKSPACE_DIR: &str = "cami-workspace";

/// Resolved locations of the workspace documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// Workspace root directory
    pub root: PathBuf,
}

impl WorkspaceLayout {
    /// Layout rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] when neither an explicit root nor
    /// the environment override is given and the home directory is unknown.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(root) = explicit {
            return Ok(Self::at(root));
        }
        if let Some(root) = std::env::var_os(WORKSPACE_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::at(home.join(DEFAULT_WORKSPACE_DIR)))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CamiPath::ConfigFile)
    }

    pub fn central_manifest_path(&self) -> PathBuf {
        self.root.join(CamiPath::CentralManifest)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join(CamiPath::SourcesDir)
    }

    pub fn deployments_lock_path(&self) -> PathBuf {
        self.root.join(CamiPath::DeploymentsLock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let layout = WorkspaceLayout::resolve(Some(Path::new("/tmp/ws"))).unwrap();
        assert_eq!(layout.root, PathBuf::from("/tmp/ws"));
        assert_eq!(layout.config_path(), PathBuf::from("/tmp/ws/config.yaml"));
        assert_eq!(
            layout.central_manifest_path(),
            PathBuf::from("/tmp/ws/deployments.yaml")
        );
        assert_eq!(layout.sources_dir(), PathBuf::from("/tmp/ws/sources"));
    }
}
