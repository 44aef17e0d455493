//! Agent records: parsing, rendering and multi-source aggregation

mod loader;
mod parser;

pub use loader::{
    AggregateOutcome, FailedSource, SourceSpec, SourcedAgent, load_agents, load_agents_from_sources,
};
pub use parser::{parse_agent_file, parse_agent_str};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An agent definition read from a markdown file with YAML frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    /// Empty means unversioned
    pub version: String,
    pub description: String,
    /// First directory below the source root; empty when uncategorized
    pub category: String,
    pub file_path: PathBuf,
    /// Frontmatter entries other than name, version and description, kept
    /// verbatim so rewriting a file does not drop keys such as `tools`
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub extra_frontmatter: String,
    /// Markdown following the closing frontmatter delimiter
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub body: String,
}

impl AgentRecord {
    /// Base name of the agent file, e.g. `frontend.md`.
    pub fn file_name(&self) -> String {
        cami_fs::file_name_str(&self.file_path)
    }

    pub fn is_versioned(&self) -> bool {
        !self.version.is_empty()
    }

    /// Render the record back to its on-disk form.
    pub fn render(&self) -> String {
        format!(
            "---\nname: {}\nversion: {}\ndescription: {}\n{}---\n{}",
            yaml_scalar(&self.name),
            yaml_scalar(&self.version),
            yaml_scalar(&self.description),
            self.extra_frontmatter,
            self.body
        )
    }
}

/// Format a string as a YAML scalar, quoting only when a plain scalar would
/// change its meaning.
fn yaml_scalar(value: &str) -> String {
    if is_plain_safe(value) {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// A plain scalar is safe when YAML reads it back as the same string, so
/// `1.10`, `0x10`, `true` and `a: b` all get quoted.
fn is_plain_safe(value: &str) -> bool {
    if value.chars().any(char::is_control) {
        return false;
    }
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(parsed)) if parsed == value
    )
}
