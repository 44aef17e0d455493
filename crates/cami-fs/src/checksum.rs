//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used for
//! drift detection of deployed agents. Agent hashes are taken over
//! *normalized* text so that cosmetic re-saves (CRLF vs LF, trailing spaces,
//! extra blank lines) do not register as changes.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::frontmatter::split_frontmatter;
use crate::{Error, Result, io};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content as-is.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's raw bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Normalize text for hashing.
///
/// Line endings become `\n`, the whole text is trimmed, trailing spaces and
/// tabs are stripped from every line and runs of blank lines collapse to a
/// single blank line. The output is a fixed point of this function.
pub fn normalize_content(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in unified.trim().split('\n') {
        let line = line.trim_end_matches([' ', '\t']);
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push(line);
    }

    out.join("\n")
}

/// Hash of the normalized full text.
pub fn content_hash(text: &str) -> String {
    compute_content_checksum(&normalize_content(text))
}

/// Hash of the normalized frontmatter only.
///
/// # Errors
///
/// Returns [`Error::NoFrontmatter`] when the text has no complete
/// `---` delimited block.
pub fn metadata_hash(text: &str) -> Result<String> {
    let frontmatter = split_frontmatter(text).map_err(|_| Error::NoFrontmatter)?;
    Ok(compute_content_checksum(&normalize_content(frontmatter.yaml)))
}

/// [`content_hash`] of a file.
pub fn content_hash_file(path: &Path) -> Result<String> {
    Ok(content_hash(&io::read_text(path)?))
}

/// [`metadata_hash`] of a file.
pub fn metadata_hash_file(path: &Path) -> Result<String> {
    metadata_hash(&io::read_text(path)?)
}
