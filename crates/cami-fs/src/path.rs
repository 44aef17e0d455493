//! Path helpers

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Resolve `path` to an absolute path.
///
/// Existing paths are canonicalized (without the `\\?\` prefix on Windows).
/// Paths that do not exist yet are joined onto the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return Ok(canonical);
    }
    std::path::absolute(path).map_err(|e| Error::io(path, e))
}

/// The final component of `path` as a string, or an empty string.
pub fn file_name_str(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_of_existing_dir_is_canonical() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a");
        std::fs::create_dir(&nested).unwrap();

        let resolved = absolute_path(&nested.join("..").join("a")).unwrap();
        assert_eq!(resolved, dunce::canonicalize(&nested).unwrap());
    }

    #[test]
    fn absolute_path_of_missing_path_is_absolute() {
        let resolved = absolute_path(Path::new("does-not-exist-yet")).unwrap();
        assert!(resolved.is_absolute());
    }

    #[test]
    fn file_name_str_handles_root() {
        assert_eq!(file_name_str(Path::new("/a/b.md")), "b.md");
        assert_eq!(file_name_str(Path::new("/")), "");
    }
}
