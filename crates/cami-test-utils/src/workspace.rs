//! [`TestWorkspace`]: a temporary CAMI workspace with sources and projects.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::agents::write_agent;

/// A temporary directory laid out as a CAMI workspace.
///
/// The workspace root is `<temp>/workspace`; projects go under
/// `<temp>/projects` so that scans of one never see the other.
///
/// # Example
///
/// ```rust,no_run
/// use cami_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// let team = ws.create_source("team", &[("frontend", "1.0.0")]);
/// let app = ws.create_project("app", &[("frontend", "")]);
/// ws.assert_file_exists(&app.join(".claude/agents/frontend.md"));
/// # let _ = team;
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create the temporary workspace and its `sources/` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("workspace/sources")).unwrap();
        fs::create_dir_all(temp_dir.path().join("projects")).unwrap();
        Self { temp_dir }
    }

    /// The temporary directory holding everything.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The workspace root.
    pub fn root(&self) -> PathBuf {
        self.base().join("workspace")
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root().join("sources")
    }

    /// Create `sources/<name>` holding one file per `(name, version)` agent.
    pub fn create_source(&self, name: &str, agents: &[(&str, &str)]) -> PathBuf {
        let dir = self.sources_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        for (agent, version) in agents {
            write_agent(&dir, agent, version);
        }
        dir
    }

    /// Create `projects/<name>` with the given agents deployed in
    /// `.claude/agents`. No agents means no `.claude` directory at all.
    pub fn create_project(&self, name: &str, agents: &[(&str, &str)]) -> PathBuf {
        let dir = self.base().join("projects").join(name);
        fs::create_dir_all(&dir).unwrap();
        let agents_dir = dir.join(".claude/agents");
        for (agent, version) in agents {
            write_agent(&agents_dir, agent, version);
        }
        dir
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &Path) {
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &Path, content: &str) {
        let file_content = fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path.display(),
            content,
            file_content
        );
    }
}
