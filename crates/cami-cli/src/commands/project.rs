//! Project analysis and normalization commands

use std::path::Path;

use colored::Colorize;

use cami_core::{
    ProjectNormalizationLevel, ProjectNormalizationOptions, ProjectState, Workspace,
    analyze_project, normalize_project,
};

use crate::error::Result;
use crate::output::print_json;

/// Run the project analyze command
pub fn run_project_analyze(ws: &Workspace, path: &Path, json: bool) -> Result<()> {
    let config = ws.load_config()?;
    let analysis = analyze_project(path, &config.agent_sources)?;

    if json {
        return print_json(&analysis);
    }

    let state = match analysis.state {
        ProjectState::CamiNative => analysis.state.as_str().green(),
        ProjectState::NonCami => analysis.state.as_str().dimmed(),
        _ => analysis.state.as_str().yellow(),
    };
    println!("{}: {}", path.display().to_string().bold(), state);
    println!("{}: {}", "Agents".dimmed(), analysis.agent_count);

    for agent in &analysis.agents {
        let version = if agent.has_version {
            format!("v{}", agent.version)
        } else {
            "unversioned".to_string()
        };
        let source = match &agent.matched_source {
            Some(matched) => format!("from {}", matched.source),
            None => "no source".to_string(),
        };
        let mut flags = Vec::new();
        if agent.is_tracked {
            flags.push("tracked".green().to_string());
        }
        if agent.needs_upgrade {
            flags.push("upgrade available".yellow().to_string());
        }
        println!("  {:<24} {:<12} {:<20} {}", agent.name, version.dimmed(), source.dimmed(), flags.join(" "));
    }

    let recs = &analysis.recommendations;
    if recs.minimal_required || recs.standard_recommended {
        println!();
        println!("{}:", "Recommended".bold());
        if recs.minimal_required {
            println!("  {}", "cami project normalize --level minimal".cyan());
        }
        if recs.standard_recommended {
            println!("  {}", "cami project normalize --level standard".cyan());
        }
    }
    Ok(())
}

/// Run the project normalize command
pub fn run_project_normalize(
    ws: &Workspace,
    path: &Path,
    level: &str,
    skip_agents: Vec<String>,
    custom_overrides: Vec<String>,
) -> Result<()> {
    let level: ProjectNormalizationLevel = level.parse()?;
    let config = ws.load_config()?;
    let options = ProjectNormalizationOptions {
        level,
        skip_agents,
        custom_overrides,
    };
    let result = normalize_project(ws.manifests(), path, &options, &config.agent_sources)?;

    println!("{} Backup at {}", "✓".green(), result.backup_path.display());
    for change in &result.changes {
        println!("  {} {}", "+".green(), change);
    }
    println!(
        "{} -> {}",
        result.state_before.as_str().dimmed(),
        result.state_after.as_str().green()
    );
    Ok(())
}
