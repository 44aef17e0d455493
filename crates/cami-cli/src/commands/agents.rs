//! Agent commands: list, deploy, scan, update-docs and discover

use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;

use cami_core::{
    DeployStatus, DeploymentStatus, DiscoverOptions, SourcedAgent, Workspace, deploy_and_record,
    discover_projects, load_agents_from_sources, scan_all_locations, update_claude_md,
};

use crate::error::{CliError, Result};
use crate::output::{print_breakdown, print_json, status_symbol};

/// Run the list command
pub fn run_list(ws: &Workspace, json: bool) -> Result<()> {
    let config = ws.load_config()?;
    let outcome = load_agents_from_sources(&config.source_specs());

    if json {
        return print_json(&outcome.agents);
    }

    for failed in &outcome.failed_sources {
        eprintln!(
            "{} source {} skipped: {}",
            "warning:".yellow().bold(),
            failed.path.display(),
            failed.message
        );
    }

    if outcome.agents.is_empty() {
        println!("{}", "No agents found".dimmed());
        println!();
        println!("Add a source with {}", "cami source add <git-url>".cyan());
        return Ok(());
    }

    let mut by_category: BTreeMap<&str, Vec<&SourcedAgent>> = BTreeMap::new();
    for agent in &outcome.agents {
        let category = if agent.record.category.is_empty() {
            "uncategorized"
        } else {
            agent.record.category.as_str()
        };
        by_category.entry(category).or_default().push(agent);
    }

    println!("{} ({})", "Available Agents".bold(), outcome.agents.len());
    println!();
    for (category, agents) in by_category {
        println!("{}:", category.cyan().bold());
        for agent in agents {
            let version = if agent.record.is_versioned() {
                format!("v{}", agent.record.version)
            } else {
                "unversioned".to_string()
            };
            println!(
                "  {:<24} {:<12} {}",
                agent.record.name.green(),
                version.dimmed(),
                agent.source.dimmed()
            );
            if !agent.record.description.is_empty() {
                println!("  {}", agent.record.description);
            }
        }
        println!();
    }
    Ok(())
}

/// Run the deploy command
pub fn run_deploy(ws: &Workspace, agents: &[String], location: &Path, overwrite: bool) -> Result<()> {
    let report = deploy_and_record(ws, agents, location, overwrite)?;

    println!("{} {}", "Deploying to".bold(), location.display());
    for result in &report.results {
        let detail = match &result.status {
            DeployStatus::Deployed => "deployed".green(),
            DeployStatus::Conflict => "exists (use --overwrite)".yellow(),
            DeployStatus::Failed(message) => message.red(),
        };
        println!("  {} {} {}", status_symbol(&result.item_status()), result.agent, detail);
    }
    println!();
    print_breakdown(&report.breakdown());

    if report.breakdown().failed > 0 {
        return Err(CliError::user("some agents failed to deploy"));
    }
    Ok(())
}

/// Run the scan command
pub fn run_scan(ws: &Workspace, json: bool) -> Result<()> {
    let config = ws.load_config()?;
    let available = load_agents_from_sources(&config.source_specs()).into_records();
    let report = scan_all_locations(&config.deploy_locations, &available);

    if json {
        return print_json(&report);
    }

    if config.deploy_locations.is_empty() {
        println!("{} (use {} to add)", "No locations".dimmed(), "cami location add".cyan());
        return Ok(());
    }

    for location in &report.locations {
        println!(
            "{} {}",
            location.location.name.cyan().bold(),
            location.location.path.display().to_string().dimmed()
        );
        for agent in &location.agents {
            let symbol = match agent.status {
                DeploymentStatus::UpToDate => agent.status.symbol().green(),
                DeploymentStatus::UpdateAvailable => agent.status.symbol().yellow(),
                DeploymentStatus::NotDeployed => agent.status.symbol().dimmed(),
            };
            let versions = match agent.status {
                DeploymentStatus::UpdateAvailable => {
                    format!("{} -> {}", agent.deployed_version, agent.available_version)
                }
                DeploymentStatus::UpToDate => agent.deployed_version.clone(),
                DeploymentStatus::NotDeployed => String::new(),
            };
            println!("  {} {:<24} {}", symbol, agent.name, versions.dimmed());
        }
        println!();
    }
    for (name, message) in &report.failed {
        println!("  {} {}: {}", "✗".red(), name, message);
    }
    print_breakdown(&report.breakdown());
    Ok(())
}

/// Run the update-docs command
pub fn run_update_docs(location: &Path, section: Option<&str>, dry_run: bool) -> Result<()> {
    let update = update_claude_md(location, section, dry_run)?;

    if dry_run {
        println!("{}", update.content);
        println!("{} dry run, {} not written", "note:".cyan(), update.path.display());
    } else {
        println!(
            "{} Updated {} with {} agents",
            "✓".green(),
            update.path.display(),
            update.agent_count
        );
    }
    Ok(())
}

/// Run the discover command
pub fn run_discover(
    path: &Path,
    empty_only: bool,
    has_agent: Option<String>,
    max_depth: usize,
    json: bool,
) -> Result<()> {
    let projects = discover_projects(&DiscoverOptions {
        root: path.to_path_buf(),
        empty_only,
        has_agent,
        max_depth,
    })?;

    if json {
        return print_json(&projects);
    }

    if projects.is_empty() {
        println!("{}", "No Claude projects found".dimmed());
        return Ok(());
    }

    println!("{} ({})", "Claude Projects".bold(), projects.len());
    for project in &projects {
        let shown = project.relative_path.as_deref().unwrap_or(&project.path);
        let agents = if project.has_agents {
            format!("{} agents", project.agent_count).green()
        } else {
            "no agents".dimmed()
        };
        println!("  {} ({})", shown.display(), agents);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cami_core::AgentSource;
    use cami_fs::WorkspaceLayout;
    use cami_test_utils::TestWorkspace;

    fn setup(fixture: &TestWorkspace) -> Workspace {
        let ws = Workspace::open(WorkspaceLayout::at(fixture.root()));
        ws.init().unwrap();
        let team = fixture.create_source("team", &[("frontend", "1.0.0")]);
        ws.config()
            .update(|c| c.add_source(AgentSource::local("team", &team, 50)))
            .unwrap();
        ws
    }

    #[test]
    fn test_list_and_deploy() {
        let fixture = TestWorkspace::new();
        let ws = setup(&fixture);
        let project = fixture.create_project("app", &[]);

        assert!(run_list(&ws, false).is_ok());
        assert!(run_deploy(&ws, &["frontend".into()], &project, false).is_ok());
        fixture.assert_file_exists(&project.join(".claude/agents/frontend.md"));
    }

    #[test]
    fn test_deploy_unknown_agent_fails() {
        let fixture = TestWorkspace::new();
        let ws = setup(&fixture);
        let project = fixture.create_project("app", &[]);

        assert!(run_deploy(&ws, &["nope".into()], &project, false).is_err());
    }

    #[test]
    fn test_scan_and_docs() {
        let fixture = TestWorkspace::new();
        let ws = setup(&fixture);
        let project = fixture.create_project("app", &[("frontend", "0.9.0")]);
        ws.config().update(|c| c.add_location("app", &project)).unwrap();

        assert!(run_scan(&ws, false).is_ok());
        assert!(run_update_docs(&project, None, false).is_ok());
        fixture.assert_file_contains(&project.join("CLAUDE.md"), "### frontend (v0.9.0)");
        assert!(run_discover(fixture.base(), false, None, 0, true).is_ok());
    }
}
