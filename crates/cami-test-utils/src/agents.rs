//! Agent markdown fixtures.

use std::fs;
use std::path::{Path, PathBuf};

/// Markdown for an agent. An empty `version` leaves the key out.
pub fn agent_markdown(name: &str, version: &str) -> String {
    let mut out = format!("---\nname: {name}\n");
    if !version.is_empty() {
        out.push_str(&format!("version: {version}\n"));
    }
    out.push_str(&format!("description: The {name} agent\n---\n\n# {name}\n\nDoes {name} things.\n"));
    out
}

/// Write `<dir>/<name>.md` and return its path.
///
/// # Panics
/// Panics if the directory or file cannot be written.
pub fn write_agent(dir: &Path, name: &str, version: &str) -> PathBuf {
    fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("write_agent: failed to create {}: {e}", dir.display()));
    let path = dir.join(format!("{name}.md"));
    fs::write(&path, agent_markdown(name, version))
        .unwrap_or_else(|e| panic!("write_agent: failed to write {}: {e}", path.display()));
    path
}
