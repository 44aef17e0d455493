//! The CAMI-managed "Deployed Agents" section of a project's `CLAUDE.md`
//!
//! The section sits between marker comments. Updating replaces an existing
//! section in place and keeps everything around it; without one, the section
//! is appended.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cami_fs::CamiPath;
use chrono::{Local, SecondsFormat};
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::agent::AgentRecord;
use crate::discovery::deployed_agents;
use crate::{Error, Result};

/// Closing marker of the managed section
pub const SECTION_MARKER_END: &str = "<!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->";

pub const DEFAULT_SECTION_NAME: &str = "Deployed Agents";

/// Matches the opening marker with or without a timestamp
static SECTION_MARKER_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- CAMI-MANAGED: DEPLOYED-AGENTS(?:\s*\|\s*Last Updated:\s*[^>]+)?\s*-->")
        .expect("Invalid section marker regex")
});

/// Result of [`update_claude_md`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocsUpdate {
    pub path: PathBuf,
    pub content: String,
    pub agent_count: usize,
    /// False for a dry run
    pub written: bool,
}

/// Regenerate the managed section of `<project>/CLAUDE.md` from the agents
/// deployed in the project.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the project has no agents directory or
/// no parseable agents in it.
pub fn update_claude_md(project: &Path, section_name: Option<&str>, dry_run: bool) -> Result<DocsUpdate> {
    let agents_dir = project.join(CamiPath::AgentsDir);
    if !agents_dir.is_dir() {
        return Err(Error::not_found("agents directory", &agents_dir));
    }
    let agents = deployed_agents(&agents_dir)?;
    if agents.is_empty() {
        return Err(Error::not_found("agents in", &agents_dir));
    }

    let section = generate_section(
        section_name.unwrap_or(DEFAULT_SECTION_NAME),
        &agents,
        &Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    );

    let path = project.join(CamiPath::ClaudeMd);
    let existing = if path.exists() {
        cami_fs::io::read_text(&path)?
    } else {
        String::new()
    };
    let content = merge_content(&existing, &section);

    if !dry_run {
        cami_fs::io::write_text(&path, &content)?;
        info!(path = %path.display(), agents = agents.len(), "Updated CLAUDE.md");
    }

    Ok(DocsUpdate {
        path,
        content,
        agent_count: agents.len(),
        written: !dry_run,
    })
}

/// Render the managed section.
pub fn generate_section(section_name: &str, agents: &[AgentRecord], timestamp: &str) -> String {
    let mut out = format!(
        "<!-- CAMI-MANAGED: DEPLOYED-AGENTS | Last Updated: {timestamp} -->\n## {section_name}\n\n\
         The following Claude Code agents are available in this project:\n\n"
    );
    for agent in agents {
        out.push_str("### ");
        out.push_str(&agent.name);
        if agent.is_versioned() {
            out.push_str(&format!(" (v{})", agent.version));
        }
        out.push('\n');
        if !agent.description.is_empty() {
            out.push_str(&agent.description);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(SECTION_MARKER_END);
    out.push('\n');
    out
}

/// Byte range of the managed section in `content`, including the end
/// marker's line break. The end marker is only looked for after the start.
fn section_range(content: &str) -> Option<(usize, usize)> {
    let start_match = SECTION_MARKER_START.find(content)?;
    let after_start = start_match.end();
    let marker = after_start + content[after_start..].find(SECTION_MARKER_END)?;
    let start = start_match.start();
    let mut end = marker + SECTION_MARKER_END.len();
    if let Some(newline) = content[end..].find('\n') {
        end += newline + 1;
    }
    Some((start, end))
}

/// Put `section` into `existing`, replacing a managed section if present.
pub fn merge_content(existing: &str, section: &str) -> String {
    if existing.is_empty() {
        return section.to_string();
    }

    match section_range(existing) {
        Some((start, end)) => {
            format!("{}{}{}", &existing[..start], section, &existing[end..])
        }
        _ => {
            let mut merged = existing.to_string();
            if !merged.ends_with('\n') {
                merged.push('\n');
            }
            merged.push('\n');
            merged.push_str(section);
            merged
        }
    }
}

/// The managed section currently in `<project>/CLAUDE.md`, if any.
pub fn extract_section(project: &Path) -> Result<Option<String>> {
    let path = project.join(CamiPath::ClaudeMd);
    if !path.exists() {
        return Ok(None);
    }
    let content = cami_fs::io::read_text(&path)?;
    Ok(section_range(&content).map(|(start, end)| content[start..end].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn agent(name: &str, version: &str, description: &str) -> AgentRecord {
        AgentRecord {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            category: String::new(),
            file_path: PathBuf::from(format!("{name}.md")),
            extra_frontmatter: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_generate_section() {
        let section = generate_section(
            "Deployed Agents",
            &[agent("frontend", "1.2.0", "Builds UIs"), agent("notes", "", "")],
            "2025-10-09T14:30:00-05:00",
        );
        insta::assert_snapshot!(section, @r"
        <!-- CAMI-MANAGED: DEPLOYED-AGENTS | Last Updated: 2025-10-09T14:30:00-05:00 -->
        ## Deployed Agents

        The following Claude Code agents are available in this project:

        ### frontend (v1.2.0)
        Builds UIs

        ### notes

        <!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->
        ");
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let existing = "# Project\n\nIntro.\n\n<!-- CAMI-MANAGED: DEPLOYED-AGENTS -->\nold stuff\n<!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->\n\n## Footer\n";
        let merged = merge_content(existing, "NEW SECTION\n");
        assert_eq!(merged, "# Project\n\nIntro.\n\nNEW SECTION\n\n## Footer\n");
    }

    #[test]
    fn test_merge_replaces_timestamped_marker() {
        let existing = "<!-- CAMI-MANAGED: DEPLOYED-AGENTS | Last Updated: 2024-01-01T00:00:00Z -->\nold\n<!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->";
        assert_eq!(merge_content(existing, "NEW\n"), "NEW\n");
    }

    #[test]
    fn test_merge_appends_without_section() {
        assert_eq!(merge_content("# Project", "S\n"), "# Project\n\nS\n");
        assert_eq!(merge_content("", "S\n"), "S\n");
    }

    #[test]
    fn test_update_claude_md_roundtrip() {
        let temp = TempDir::new().unwrap();
        let agents = temp.path().join(".claude/agents");
        fs::create_dir_all(&agents).unwrap();
        fs::write(agents.join("api.md"), "---\nname: api\nversion: 1.0.0\ndescription: API\n---\n").unwrap();
        fs::write(temp.path().join("CLAUDE.md"), "# Mine\n").unwrap();

        let preview = update_claude_md(temp.path(), None, true).unwrap();
        assert!(!preview.written);
        assert_eq!(fs::read_to_string(temp.path().join("CLAUDE.md")).unwrap(), "# Mine\n");

        let first = update_claude_md(temp.path(), None, false).unwrap();
        assert!(first.content.starts_with("# Mine\n\n<!-- CAMI-MANAGED"));
        assert!(first.content.contains("### api (v1.0.0)\nAPI\n"));

        let second = update_claude_md(temp.path(), Some("Agents"), false).unwrap();
        assert_eq!(second.content.matches(SECTION_MARKER_END).count(), 1);
        assert!(second.content.contains("## Agents\n"));

        let section = extract_section(temp.path()).unwrap().unwrap();
        assert!(section.ends_with("<!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->\n"));
    }

    #[test]
    fn test_end_marker_before_section_is_user_text() {
        let temp = TempDir::new().unwrap();
        let agents = temp.path().join(".claude/agents");
        fs::create_dir_all(&agents).unwrap();
        fs::write(agents.join("api.md"), "---\nname: api\nversion: 1.0.0\n---\n").unwrap();
        let notes = format!("Notes: close with `{SECTION_MARKER_END}`\n");
        fs::write(temp.path().join("CLAUDE.md"), &notes).unwrap();

        update_claude_md(temp.path(), None, false).unwrap();
        let second = update_claude_md(temp.path(), None, false).unwrap();

        assert!(second.content.starts_with(&notes));
        assert_eq!(second.content.matches("## Deployed Agents").count(), 1);
        let section = extract_section(temp.path()).unwrap().unwrap();
        assert!(section.starts_with("<!-- CAMI-MANAGED: DEPLOYED-AGENTS"));
        assert!(section.contains("### api (v1.0.0)"));
    }

    #[test]
    fn test_end_marker_without_start_appends() {
        let existing = format!("{SECTION_MARKER_END}\n");
        assert_eq!(merge_content(&existing, "S\n"), format!("{existing}\nS\n"));
    }

    #[test]
    fn test_update_without_agents_dir() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            update_claude_md(temp.path(), None, false),
            Err(Error::NotFound(_))
        ));
        assert_eq!(extract_section(temp.path()).unwrap(), None);
    }
}
