//! Agent file parsing

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use super::AgentRecord;
use crate::error::{ParseError, ParseErrorKind};
use crate::{Error, Result};

/// Keys read into [`AgentRecord`] fields. Everything else is carried verbatim.
const KNOWN_KEYS: [&str; 3] = ["name", "version", "description"];

/// Frontmatter fields as written. Deserializing plain scalars into `String`
/// keeps their source text, so `version: 1.10` stays `1.10`.
#[derive(Debug, Default, Deserialize)]
struct RawFields {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

/// Parse an agent file from disk.
///
/// # Errors
///
/// Returns [`Error::Fs`] when the file cannot be read and [`Error::Parse`]
/// when its frontmatter is malformed or lacks a name.
pub fn parse_agent_file(path: &Path) -> Result<AgentRecord> {
    let text = std::fs::read_to_string(path).map_err(|e| cami_fs::Error::io(path, e))?;
    parse_agent_str(&text, path)
}

/// Parse agent text that was read from `path`.
///
/// `category` is left empty; the loader fills it from the directory layout.
pub fn parse_agent_str(text: &str, path: &Path) -> Result<AgentRecord> {
    let fail = |kind: ParseErrorKind| {
        Error::Parse(ParseError {
            path: path.to_path_buf(),
            kind,
        })
    };

    let frontmatter = cami_fs::split_frontmatter(text).map_err(|e| fail(e.into()))?;
    let yaml = frontmatter.yaml;

    let shape = if yaml.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_yaml::from_str::<Value>(yaml)
    };
    let fields = match shape {
        Ok(Value::Null) => RawFields::default(),
        Ok(Value::Mapping(_)) => serde_yaml::from_str::<RawFields>(yaml)
            .map_err(|e| fail(ParseErrorKind::InvalidYaml(e.to_string())))?,
        Ok(_) => {
            return Err(fail(ParseErrorKind::InvalidYaml(
                "frontmatter is not a mapping".into(),
            )));
        }
        Err(e) => return Err(fail(ParseErrorKind::InvalidYaml(e.to_string()))),
    };

    let name = fields.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(fail(ParseErrorKind::MissingName));
    }

    Ok(AgentRecord {
        name,
        version: fields.version.unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        category: String::new(),
        file_path: path.to_path_buf(),
        extra_frontmatter: extra_entries(yaml),
        body: frontmatter.body.to_string(),
    })
}

/// Top-level frontmatter entries whose key is not in [`KNOWN_KEYS`], with
/// their continuation lines, each line ending in `\n`.
fn extra_entries(yaml: &str) -> String {
    let mut extra = String::new();
    let mut keep = false;

    for line in yaml.lines() {
        let starts_entry = line
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace() && c != '-' && c != '#');
        if starts_entry {
            let key = line.split(':').next().unwrap_or_default();
            let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
            keep = !KNOWN_KEYS.contains(&key);
        }
        if keep {
            extra.push_str(line.trim_end_matches('\r'));
            extra.push('\n');
        }
    }
    extra
}
