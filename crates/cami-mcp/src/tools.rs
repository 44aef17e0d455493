//! MCP tool definitions
//!
//! # Tool Categories
//!
//! ## Agents
//! - `list_agents`, `deploy_agents`, `scan_deployed_agents`, `update_claude_md`
//!
//! ## Locations
//! - `list_locations`, `add_location`, `remove_location`
//!
//! ## Sources
//! - `list_sources`, `add_source`, `update_source`, `source_status`,
//!   `reconcile_sources`
//!
//! ## Normalization
//! - `detect_source_state`, `normalize_source`, `detect_project_state`,
//!   `normalize_project`
//!
//! ## Backups
//! - `list_backups`, `cleanup_backups`, `restore_backup`
//!
//! ## Discovery
//! - `discover_projects`, `onboard`

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn no_arguments() -> serde_json::Value {
    json!({ "type": "object", "properties": {} })
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Agents
        tool(
            "list_agents",
            "List all agents available from the configured sources. When two sources define \
             the same agent, the one with the higher priority number is listed.",
            no_arguments(),
        ),
        tool(
            "deploy_agents",
            "Deploy agents into a project's .claude/agents/ directory and record them in the \
             project and central manifests.",
            json!({
                "type": "object",
                "properties": {
                    "agent_names": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Agent names to deploy"
                    },
                    "target_path": {
                        "type": "string",
                        "description": "Absolute path to the project directory"
                    },
                    "overwrite": {
                        "type": "boolean",
                        "description": "Replace agent files that already exist (default false)"
                    }
                },
                "required": ["agent_names", "target_path"]
            }),
        ),
        tool(
            "scan_deployed_agents",
            "Compare the agents deployed in a project with the versions available from sources.",
            json!({
                "type": "object",
                "properties": {
                    "target_path": {
                        "type": "string",
                        "description": "Absolute path to the project directory"
                    }
                },
                "required": ["target_path"]
            }),
        ),
        tool(
            "update_claude_md",
            "Regenerate the managed 'Deployed Agents' section of a project's CLAUDE.md.",
            json!({
                "type": "object",
                "properties": {
                    "target_path": {
                        "type": "string",
                        "description": "Absolute path to the project directory"
                    },
                    "section": {
                        "type": "string",
                        "description": "Heading of the managed section"
                    },
                    "dry_run": {
                        "type": "boolean",
                        "description": "Return the new content without writing it"
                    }
                },
                "required": ["target_path"]
            }),
        ),
        // Locations
        tool("list_locations", "List tracked deploy locations.", no_arguments()),
        tool(
            "add_location",
            "Track a project directory as a deploy location.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Unique location name" },
                    "path": { "type": "string", "description": "Absolute path to the project" }
                },
                "required": ["name", "path"]
            }),
        ),
        tool(
            "remove_location",
            "Stop tracking a deploy location.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Location name" }
                },
                "required": ["name"]
            }),
        ),
        // Sources
        tool(
            "list_sources",
            "List configured agent sources with priorities and agent counts.",
            no_arguments(),
        ),
        tool(
            "add_source",
            "Clone a git repository into the workspace sources directory and register it.",
            json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Git URL to clone" },
                    "name": {
                        "type": "string",
                        "description": "Source name (derived from the URL if omitted)"
                    },
                    "priority": {
                        "type": "integer",
                        "description": "Priority, higher number wins (default 50)"
                    }
                },
                "required": ["url"]
            }),
        ),
        tool(
            "update_source",
            "Pull git-backed sources. Updates all of them unless a name is given.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Only this source" }
                }
            }),
        ),
        tool(
            "source_status",
            "Show the git working tree state of each source.",
            no_arguments(),
        ),
        tool(
            "reconcile_sources",
            "Find source directories missing from the config and optionally register them.",
            json!({
                "type": "object",
                "properties": {
                    "mode": {
                        "type": "string",
                        "enum": ["check", "auto", "manual"],
                        "description": "check reports only; auto registers all; manual registers 'names'"
                    },
                    "names": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Sources to register in manual mode"
                    }
                }
            }),
        ),
        // Normalization
        tool(
            "detect_source_state",
            "Check a source for agents missing versions or descriptions and for a .camiignore.",
            json!({
                "type": "object",
                "properties": {
                    "source_name": { "type": "string", "description": "Source name" }
                },
                "required": ["source_name"]
            }),
        ),
        tool(
            "normalize_source",
            "Back up a source, then add missing versions, description placeholders and a \
             .camiignore.",
            json!({
                "type": "object",
                "properties": {
                    "source_name": { "type": "string", "description": "Source name" },
                    "add_versions": { "type": "boolean" },
                    "add_descriptions": { "type": "boolean" },
                    "create_camiignore": { "type": "boolean" }
                },
                "required": ["source_name"]
            }),
        ),
        tool(
            "detect_project_state",
            "Report a project's normalization state and recommended actions.",
            json!({
                "type": "object",
                "properties": {
                    "project_path": { "type": "string", "description": "Project directory" }
                },
                "required": ["project_path"]
            }),
        ),
        tool(
            "normalize_project",
            "Back up a project, then write a CAMI manifest for its deployed agents.",
            json!({
                "type": "object",
                "properties": {
                    "project_path": { "type": "string", "description": "Project directory" },
                    "level": {
                        "type": "string",
                        "enum": ["minimal", "standard", "full"],
                        "description": "minimal by default; full is not implemented"
                    },
                    "skip_agents": { "type": "array", "items": { "type": "string" } },
                    "custom_overrides": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["project_path"]
            }),
        ),
        // Backups
        tool(
            "list_backups",
            "List the backups of a directory, newest first.",
            json!({
                "type": "object",
                "properties": {
                    "target_path": { "type": "string", "description": "Directory that was backed up" }
                },
                "required": ["target_path"]
            }),
        ),
        tool(
            "cleanup_backups",
            "Remove all but the newest backups of a directory (keeps 3 by default).",
            json!({
                "type": "object",
                "properties": {
                    "target_path": { "type": "string", "description": "Directory that was backed up" },
                    "keep_recent": { "type": "integer", "description": "Backups to keep" }
                },
                "required": ["target_path"]
            }),
        ),
        tool(
            "restore_backup",
            "Replace a directory with one of its backups.",
            json!({
                "type": "object",
                "properties": {
                    "backup_path": { "type": "string", "description": "Backup directory" },
                    "target_path": { "type": "string", "description": "Directory to restore into" }
                },
                "required": ["backup_path", "target_path"]
            }),
        ),
        // Discovery
        tool(
            "discover_projects",
            "Find directories containing .claude/ below a root directory.",
            json!({
                "type": "object",
                "properties": {
                    "root": { "type": "string", "description": "Directory to search" },
                    "empty_only": { "type": "boolean" },
                    "has_agent": { "type": "string" },
                    "max_depth": { "type": "integer", "description": "0 for unlimited" }
                },
                "required": ["root"]
            }),
        ),
        tool(
            "onboard",
            "Summarize the workspace setup and suggest the next step.",
            no_arguments(),
        ),
    ]
}
