//! MCP Tool Handlers
//!
//! Each handler parses its arguments, delegates to `cami-core` and returns a
//! JSON value that the server renders as the tool's text content.
//!
//! Handlers are `async fn` to match the server's tokio runtime even though
//! the core operations are synchronous.

use std::path::{Path, PathBuf};

use cami_core::backup::BackupManager;
use cami_core::discovery::scan_location;
use cami_core::sources;
use cami_core::{
    DeployLocation, DeployStatus, DiscoverOptions, FixMode, ProjectNormalizationLevel,
    ProjectNormalizationOptions, SourceNormalizationOptions, Workspace, analyze_project,
    analyze_source, apply_fix, deploy_and_record, discover_projects, load_agents,
    load_agents_from_sources, normalize_project, normalize_source, reconcile, update_claude_md,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{Error, Result};

/// Handle a tool call by dispatching to the appropriate handler
pub async fn handle_tool_call(ws: &Workspace, tool_name: &str, arguments: Value) -> Result<Value> {
    match tool_name {
        // Agents
        "list_agents" => handle_list_agents(ws).await,
        "deploy_agents" => handle_deploy_agents(ws, arguments).await,
        "scan_deployed_agents" => handle_scan_deployed_agents(ws, arguments).await,
        "update_claude_md" => handle_update_claude_md(arguments).await,

        // Locations
        "list_locations" => handle_list_locations(ws).await,
        "add_location" => handle_add_location(ws, arguments).await,
        "remove_location" => handle_remove_location(ws, arguments).await,

        // Sources
        "list_sources" => handle_list_sources(ws).await,
        "add_source" => handle_add_source(ws, arguments).await,
        "update_source" => handle_update_source(ws, arguments).await,
        "source_status" => handle_source_status(ws).await,
        "reconcile_sources" => handle_reconcile_sources(ws, arguments).await,

        // Normalization
        "detect_source_state" => handle_detect_source_state(ws, arguments).await,
        "normalize_source" => handle_normalize_source(ws, arguments).await,
        "detect_project_state" => handle_detect_project_state(ws, arguments).await,
        "normalize_project" => handle_normalize_project(ws, arguments).await,

        // Backups
        "list_backups" => handle_list_backups(arguments).await,
        "cleanup_backups" => handle_cleanup_backups(arguments).await,
        "restore_backup" => handle_restore_backup(arguments).await,

        // Discovery
        "discover_projects" => handle_discover_projects(arguments).await,
        "onboard" => handle_onboard(ws).await,

        _ => Err(Error::UnknownTool(tool_name.to_string())),
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    // Tools without required arguments may be called with `null`
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

// ============================================================================
// Agent Handlers
// ============================================================================

async fn handle_list_agents(ws: &Workspace) -> Result<Value> {
    let config = ws.load_config()?;
    let outcome = load_agents_from_sources(&config.source_specs());

    Ok(json!({
        "count": outcome.agents.len(),
        "agents": outcome.agents,
        "failed_sources": outcome.failed_sources,
    }))
}

#[derive(Debug, Deserialize)]
struct DeployAgentsArgs {
    agent_names: Vec<String>,
    target_path: PathBuf,
    #[serde(default)]
    overwrite: bool,
}

async fn handle_deploy_agents(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: DeployAgentsArgs = parse_args(arguments)?;
    if args.agent_names.is_empty() {
        return Err(Error::InvalidArgument("agent_names must not be empty".into()));
    }

    let report = deploy_and_record(ws, &args.agent_names, &args.target_path, args.overwrite)?;
    let conflicts: Vec<&str> = report
        .results
        .iter()
        .filter(|r| r.status == DeployStatus::Conflict)
        .map(|r| r.agent.as_str())
        .collect();

    Ok(json!({
        "target_path": report.project,
        "summary": report.breakdown(),
        "results": report.results,
        "conflicts": conflicts,
        "manifest_updated": report.recorded,
    }))
}

#[derive(Debug, Deserialize)]
struct TargetPathArgs {
    target_path: PathBuf,
}

async fn handle_scan_deployed_agents(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: TargetPathArgs = parse_args(arguments)?;
    let config = ws.load_config()?;
    let available = load_agents_from_sources(&config.source_specs()).into_records();

    let location = DeployLocation {
        name: args
            .target_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: args.target_path,
    };
    let status = scan_location(&location, &available)?;
    Ok(serde_json::to_value(status)?)
}

#[derive(Debug, Deserialize)]
struct UpdateClaudeMdArgs {
    target_path: PathBuf,
    section: Option<String>,
    #[serde(default)]
    dry_run: bool,
}

async fn handle_update_claude_md(arguments: Value) -> Result<Value> {
    let args: UpdateClaudeMdArgs = parse_args(arguments)?;
    let update = update_claude_md(&args.target_path, args.section.as_deref(), args.dry_run)?;
    Ok(serde_json::to_value(update)?)
}

// ============================================================================
// Location Handlers
// ============================================================================

async fn handle_list_locations(ws: &Workspace) -> Result<Value> {
    let config = ws.load_config()?;
    Ok(json!({
        "count": config.deploy_locations.len(),
        "locations": config.deploy_locations,
    }))
}

#[derive(Debug, Deserialize)]
struct AddLocationArgs {
    name: String,
    path: PathBuf,
}

async fn handle_add_location(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: AddLocationArgs = parse_args(arguments)?;
    require_non_empty("name", &args.name)?;

    ws.config().update(|c| c.add_location(&args.name, &args.path))?;
    Ok(json!({
        "success": true,
        "name": args.name,
        "path": args.path,
    }))
}

#[derive(Debug, Deserialize)]
struct NameArgs {
    name: String,
}

async fn handle_remove_location(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: NameArgs = parse_args(arguments)?;
    let removed = ws.config().update(|c| c.remove_location(&args.name))?;
    Ok(json!({
        "success": true,
        "removed": removed,
    }))
}

// ============================================================================
// Source Handlers
// ============================================================================

async fn handle_list_sources(ws: &Workspace) -> Result<Value> {
    let listings = sources::list_sources(ws)?;
    Ok(json!({
        "count": listings.len(),
        "sources": listings,
    }))
}

#[derive(Debug, Deserialize)]
struct AddSourceArgs {
    url: String,
    name: Option<String>,
    priority: Option<i32>,
}

async fn handle_add_source(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: AddSourceArgs = parse_args(arguments)?;
    require_non_empty("url", &args.url)?;

    let added = sources::add_source(ws, &args.url, args.name.as_deref(), args.priority)?;
    Ok(json!({
        "success": true,
        "source": added.source,
        "agent_count": added.agent_count,
    }))
}

#[derive(Debug, Deserialize)]
struct UpdateSourceArgs {
    name: Option<String>,
}

async fn handle_update_source(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: UpdateSourceArgs = parse_args(arguments)?;
    let report = sources::update_sources(ws, args.name.as_deref())?;
    Ok(json!({
        "summary": report.breakdown(),
        "sources": report.sources,
    }))
}

async fn handle_source_status(ws: &Workspace) -> Result<Value> {
    let statuses = sources::source_status(ws)?;
    Ok(json!({ "sources": statuses }))
}

#[derive(Debug, Deserialize)]
struct ReconcileArgs {
    mode: Option<String>,
    #[serde(default)]
    names: Vec<String>,
}

async fn handle_reconcile_sources(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: ReconcileArgs = parse_args(arguments)?;
    let mode = match args.mode.as_deref().unwrap_or("check") {
        "check" => FixMode::CheckOnly,
        "auto" => FixMode::Auto,
        "manual" => FixMode::Manual(args.names),
        other => {
            return Err(Error::InvalidArgument(format!(
                "unknown mode '{other}' (expected check, auto or manual)"
            )));
        }
    };

    let report = reconcile(ws)?;
    let added = apply_fix(ws, &report, &mode)?;
    Ok(json!({
        "clean": report.is_clean(),
        "untracked": report.untracked,
        "orphaned": report.orphaned,
        "total_on_disk": report.total_on_disk,
        "total_in_config": report.total_in_config,
        "added": added,
    }))
}

// ============================================================================
// Normalization Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct SourceNameArgs {
    source_name: String,
}

async fn handle_detect_source_state(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: SourceNameArgs = parse_args(arguments)?;
    let config = ws.load_config()?;
    let source = config.get_source(&args.source_name)?;
    let analysis = analyze_source(&source.name, &source.path)?;
    Ok(serde_json::to_value(analysis)?)
}

#[derive(Debug, Deserialize)]
struct NormalizeSourceArgs {
    source_name: String,
    #[serde(default)]
    add_versions: bool,
    #[serde(default)]
    add_descriptions: bool,
    #[serde(default)]
    create_camiignore: bool,
}

async fn handle_normalize_source(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: NormalizeSourceArgs = parse_args(arguments)?;
    let config = ws.load_config()?;
    let source = config.get_source(&args.source_name)?;

    let options = SourceNormalizationOptions {
        add_versions: args.add_versions,
        add_descriptions: args.add_descriptions,
        create_ignore_file: args.create_camiignore,
    };
    let result = normalize_source(&source.name, &source.path, options)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Debug, Deserialize)]
struct ProjectPathArgs {
    project_path: PathBuf,
}

async fn handle_detect_project_state(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: ProjectPathArgs = parse_args(arguments)?;
    let config = ws.load_config()?;
    let analysis = analyze_project(&args.project_path, &config.agent_sources)?;
    Ok(serde_json::to_value(analysis)?)
}

#[derive(Debug, Deserialize)]
struct NormalizeProjectArgs {
    project_path: PathBuf,
    level: Option<String>,
    #[serde(default)]
    skip_agents: Vec<String>,
    #[serde(default)]
    custom_overrides: Vec<String>,
}

async fn handle_normalize_project(ws: &Workspace, arguments: Value) -> Result<Value> {
    let args: NormalizeProjectArgs = parse_args(arguments)?;
    let level = match args.level.as_deref() {
        Some(level) => level.parse::<ProjectNormalizationLevel>()?,
        None => ProjectNormalizationLevel::default(),
    };
    let options = ProjectNormalizationOptions {
        level,
        skip_agents: args.skip_agents,
        custom_overrides: args.custom_overrides,
    };

    let config = ws.load_config()?;
    let result = normalize_project(
        ws.manifests(),
        &args.project_path,
        &options,
        &config.agent_sources,
    )
    .map_err(|e| match e {
        cami_core::Error::NotImplemented(what) => Error::NotImplemented(what),
        other => Error::Core(other),
    })?;
    Ok(serde_json::to_value(result)?)
}

// ============================================================================
// Backup Handlers
// ============================================================================

async fn handle_list_backups(arguments: Value) -> Result<Value> {
    let args: TargetPathArgs = parse_args(arguments)?;
    let manager = BackupManager::new();
    let analysis = manager.analyze(&args.target_path)?;
    let suggest_cleanup = manager.should_suggest_cleanup(&args.target_path)?;

    Ok(json!({
        "target_path": args.target_path,
        "analysis": analysis,
        "suggest_cleanup": suggest_cleanup,
    }))
}

#[derive(Debug, Deserialize)]
struct CleanupBackupsArgs {
    target_path: PathBuf,
    #[serde(default)]
    keep_recent: usize,
}

async fn handle_cleanup_backups(arguments: Value) -> Result<Value> {
    let args: CleanupBackupsArgs = parse_args(arguments)?;
    let result = BackupManager::new().cleanup(&args.target_path, args.keep_recent)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Debug, Deserialize)]
struct RestoreBackupArgs {
    backup_path: PathBuf,
    target_path: PathBuf,
}

async fn handle_restore_backup(arguments: Value) -> Result<Value> {
    let args: RestoreBackupArgs = parse_args(arguments)?;
    BackupManager::new().restore(&args.backup_path, &args.target_path)?;
    Ok(json!({
        "success": true,
        "restored_from": args.backup_path,
        "target_path": args.target_path,
    }))
}

// ============================================================================
// Discovery Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct DiscoverArgs {
    root: PathBuf,
    #[serde(default)]
    empty_only: bool,
    has_agent: Option<String>,
    #[serde(default)]
    max_depth: usize,
}

async fn handle_discover_projects(arguments: Value) -> Result<Value> {
    let args: DiscoverArgs = parse_args(arguments)?;
    let projects = discover_projects(&DiscoverOptions {
        root: args.root,
        empty_only: args.empty_only,
        has_agent: args.has_agent,
        max_depth: args.max_depth,
    })?;
    Ok(json!({
        "count": projects.len(),
        "projects": projects,
    }))
}

async fn handle_onboard(ws: &Workspace) -> Result<Value> {
    let config_exists = ws.config().path().exists();
    let config = ws.load_config()?;
    let total_agents = load_agents_from_sources(&config.source_specs()).agents.len();
    let cwd = std::env::current_dir()?;
    let deployed_agents = count_deployed(&cwd);

    let recommended_next = if !config_exists {
        "Initialize the workspace (cami init)"
    } else if config.agent_sources.is_empty() {
        "Add an agent source with add_source"
    } else if total_agents == 0 {
        "Configured sources contain no agents; check them with detect_source_state"
    } else if deployed_agents == 0 {
        "Deploy agents to the current project with deploy_agents"
    } else if config.deploy_locations.is_empty() {
        "Track this project with add_location to include it in scans"
    } else {
        "Setup complete; use scan_deployed_agents to check for updates"
    };

    Ok(json!({
        "workspace": ws.root(),
        "config_exists": config_exists,
        "source_count": config.agent_sources.len(),
        "location_count": config.deploy_locations.len(),
        "total_agents": total_agents,
        "current_directory": cwd,
        "deployed_agents": deployed_agents,
        "recommended_next": recommended_next,
    }))
}

fn count_deployed(project: &Path) -> usize {
    load_agents(&project.join(".claude").join("agents"))
        .map(|agents| agents.len())
        .unwrap_or(0)
}
