//! Error types for cami-core

use std::fmt;
use std::path::PathBuf;

/// Result type for cami-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why an agent file could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// File is empty or whitespace-only
    Empty,
    /// First non-blank line is not `---`
    MissingDelimiter,
    /// Opening delimiter without a closing one
    Unterminated,
    /// Frontmatter is not valid YAML
    InvalidYaml(String),
    /// `name` is absent or empty
    MissingName,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty file"),
            Self::MissingDelimiter => write!(f, "missing frontmatter delimiter '---'"),
            Self::Unterminated => write!(f, "unterminated frontmatter: no closing '---'"),
            Self::InvalidYaml(message) => write!(f, "invalid YAML frontmatter: {message}"),
            Self::MissingName => write!(f, "frontmatter has no 'name'"),
        }
    }
}

impl From<cami_fs::FrontmatterError> for ParseErrorKind {
    fn from(err: cami_fs::FrontmatterError) -> Self {
        match err {
            cami_fs::FrontmatterError::Empty => Self::Empty,
            cami_fs::FrontmatterError::MissingDelimiter => Self::MissingDelimiter,
            cami_fs::FrontmatterError::Unterminated => Self::Unterminated,
        }
    }
}

/// A malformed agent file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to parse agent {}: {kind}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub kind: ParseErrorKind,
}

/// Errors that can occur in cami-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Agent file with malformed or missing frontmatter
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Project has no CAMI manifest
    #[error("No CAMI manifest at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Agent source directory could not be read
    #[error("Cannot read agent source {path}: {message}")]
    SourceUnreadable { path: PathBuf, message: String },

    /// Path is not a backup directory
    #[error("Not a valid backup directory: {}", path.display())]
    InvalidBackup { path: PathBuf },

    /// Duplicate name or path in the configuration
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed user-supplied value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested behavior is reserved but not built
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A git subprocess exited unsuccessfully
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    /// A failure after the pre-normalization backup was taken
    #[error("Normalization failed (backup kept at {}): {source}", backup_path.display())]
    NormalizationFailed {
        backup_path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from cami-fs
    #[error(transparent)]
    Fs(#[from] cami_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn not_found(what: &str, path: &std::path::Path) -> Self {
        Self::NotFound(format!("{what} {}", path.display()))
    }
}
