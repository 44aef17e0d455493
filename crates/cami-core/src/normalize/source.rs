//! Source normalization: fill in missing agent metadata

use std::path::{Path, PathBuf};

use cami_fs::CamiPath;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::after_backup;
use crate::agent::load_agents;
use crate::backup::BackupManager;
use crate::Result;

/// Version given to unversioned agents
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Contents of a newly created `.camiignore`
pub const IGNORE_FILE_TEMPLATE: &str = "# CAMI Ignore File
# Patterns to exclude from agent loading

# Common patterns
*.draft.md
*.tmp.md
.DS_Store
README.md
CHANGELOG.md

# Directories
examples/
templates/
";

/// Fixes to apply to a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNormalizationOptions {
    pub add_versions: bool,
    pub add_descriptions: bool,
    pub create_ignore_file: bool,
}

impl SourceNormalizationOptions {
    pub fn all() -> Self {
        Self {
            add_versions: true,
            add_descriptions: true,
            create_ignore_file: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceNormalizationResult {
    pub success: bool,
    pub changes: Vec<String>,
    pub agents_updated: usize,
    pub backup_path: PathBuf,
}

/// Back up a source, then add missing versions, descriptions and ignore file.
///
/// # Errors
///
/// A backup failure is returned as is, before anything is touched. Later
/// failures are wrapped in [`crate::Error::NormalizationFailed`].
pub fn normalize_source(
    name: &str,
    path: &Path,
    options: SourceNormalizationOptions,
) -> Result<SourceNormalizationResult> {
    let backup_path = BackupManager::new().create(path)?;

    after_backup(&backup_path, || {
        let mut changes = Vec::new();
        let mut agents_updated = 0;

        for mut agent in load_agents(path)? {
            let file = agent.file_name();
            let mut updated = false;

            if options.add_versions && agent.version.is_empty() {
                agent.version = DEFAULT_VERSION.to_string();
                changes.push(format!("Added version {DEFAULT_VERSION} to {file}"));
                updated = true;
            }
            if options.add_descriptions && agent.description.is_empty() {
                agent.description = format!("Description for {} agent", agent.name);
                changes.push(format!("Added description placeholder to {file}"));
                updated = true;
            }

            if updated {
                cami_fs::io::write_text(&agent.file_path, &agent.render())?;
                agents_updated += 1;
            }
        }

        let ignore_file = path.join(CamiPath::IgnoreFile);
        if options.create_ignore_file && !ignore_file.exists() {
            cami_fs::io::write_text(&ignore_file, IGNORE_FILE_TEMPLATE)?;
            changes.push("Created .camiignore file".to_string());
        }

        for change in &changes {
            info!(source = name, "{change}");
        }
        Ok(SourceNormalizationResult {
            success: true,
            changes,
            agents_updated,
            backup_path: backup_path.clone(),
        })
    })
}
