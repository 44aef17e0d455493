//! Normalization of sources and projects
//!
//! Both operations take a backup before changing anything. Once the backup
//! exists, any failure is reported as [`Error::NormalizationFailed`] carrying
//! the backup path, and the backup is left in place for a restore.

mod project;
mod source;

pub use project::{
    ProjectNormalizationLevel, ProjectNormalizationOptions, ProjectNormalizationResult,
    UNMATCHED_PRIORITY, normalize_project,
};
pub use source::{
    DEFAULT_VERSION, IGNORE_FILE_TEMPLATE, SourceNormalizationOptions, SourceNormalizationResult,
    normalize_source,
};

use std::path::Path;

use crate::{Error, Result};

/// Attach the backup path to any failure of a post-backup step.
fn after_backup<T>(backup_path: &Path, step: impl FnOnce() -> Result<T>) -> Result<T> {
    step().map_err(|e| Error::NormalizationFailed {
        backup_path: backup_path.to_path_buf(),
        source: Box::new(e),
    })
}
