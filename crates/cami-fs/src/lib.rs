//! Filesystem layer for CAMI
//!
//! Provides the workspace layout, locked atomic I/O, a format-aware document
//! store for YAML/JSON files, frontmatter splitting and the normalized content
//! hasher used for drift detection.

pub mod checksum;
pub mod constants;
pub mod document;
pub mod error;
pub mod frontmatter;
pub mod io;
pub mod layout;
pub mod path;

pub use checksum::{content_hash, metadata_hash, normalize_content};
pub use constants::CamiPath;
pub use document::DocumentStore;
pub use error::{Error, Result};
pub use frontmatter::{Frontmatter, FrontmatterError, split_frontmatter};
pub use io::RobustnessConfig;
pub use layout::WorkspaceLayout;
pub use path::{absolute_path, file_name_str};
