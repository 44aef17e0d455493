//! Well-known CAMI file and directory names.

use std::path::Path;

/// Standard CAMI filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamiPath {
    /// The `.claude` directory inside a project
    ClaudeDir,
    /// The `.claude/agents` directory holding deployed agents
    AgentsDir,
    /// The per-project manifest, relative to the project root
    ProjectManifest,
    /// The ignore file at a source root
    IgnoreFile,
    /// The workspace configuration document
    ConfigFile,
    /// The central cross-project manifest
    CentralManifest,
    /// The directory holding cloned sources
    SourcesDir,
    /// Lock file serializing two-document deployment records
    DeploymentsLock,
    /// Project documentation file with the managed agents section
    ClaudeMd,
    /// The `.git` directory marker
    GitDir,
}

impl CamiPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeDir => ".claude",
            Self::AgentsDir => ".claude/agents",
            Self::ProjectManifest => ".claude/cami-manifest.yaml",
            Self::IgnoreFile => ".camiignore",
            Self::ConfigFile => "config.yaml",
            Self::CentralManifest => "deployments.yaml",
            Self::SourcesDir => "sources",
            Self::DeploymentsLock => ".deployments.lock",
            Self::ClaudeMd => "CLAUDE.md",
            Self::GitDir => ".git",
        }
    }
}

impl AsRef<Path> for CamiPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for CamiPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for CamiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
