//! Agent source commands

use colored::Colorize;

use cami_core::sources::{self, GitState};
use cami_core::{
    FixMode, PullOutcome, SourceNormalizationOptions, Workspace, analyze_source, apply_fix,
    normalize_source, reconcile,
};

use crate::error::Result;
use crate::interactive;
use crate::output::{print_breakdown, print_json, status_symbol};

/// Dirty lines shown per source before eliding the rest
const STATUS_PREVIEW_LINES: usize = 3;

/// Run the source add command
pub fn run_source_add(
    ws: &Workspace,
    url: &str,
    name: Option<&str>,
    priority: Option<i32>,
) -> Result<()> {
    println!("Cloning {}...", url.cyan());
    let added = sources::add_source(ws, url, name, priority)?;

    println!("{} Cloned to {}", "✓".green(), added.source.path.display());
    println!(
        "{} Added source {} with priority {}",
        "✓".green(),
        added.source.name.cyan(),
        added.source.priority
    );
    println!("{} Found {} agents", "✓".green(), added.agent_count);
    Ok(())
}

/// Run the source list command
pub fn run_source_list(ws: &Workspace, json: bool) -> Result<()> {
    let listings = sources::list_sources(ws)?;
    if json {
        return print_json(&listings);
    }

    if listings.is_empty() {
        println!("No agent sources configured.");
        println!();
        println!("Add a source with: {}", "cami source add <git-url>".cyan());
        return Ok(());
    }

    println!("{}", "Agent Sources".bold());
    println!();
    for listing in &listings {
        let source = &listing.source;
        println!("  {} (priority {})", source.name.cyan().bold(), source.priority);
        println!("    {}: {}", "Path".dimmed(), source.path.display());
        match listing.agent_count {
            Some(count) => println!("    {}: {}", "Agents".dimmed(), count),
            None => println!("    {}: {}", "Agents".dimmed(), "unreadable".red()),
        }
        if let Some(remote) = source.git.as_ref().and_then(|g| g.remote.as_deref()) {
            println!("    {}: {}", "Git".dimmed(), remote);
        }
        println!();
    }
    Ok(())
}

/// Run the source update command
pub fn run_source_update(ws: &Workspace, name: Option<&str>) -> Result<()> {
    let report = sources::update_sources(ws, name)?;

    for update in &report.sources {
        let detail = match (&update.outcome, &update.status) {
            (Some(PullOutcome::UpToDate), _) => "up to date".to_string(),
            (Some(PullOutcome::Updated), _) => "updated".to_string(),
            (None, cami_core::ItemStatus::Skipped(reason)) => reason.clone(),
            (None, cami_core::ItemStatus::Failed(message)) => message.clone(),
            (None, cami_core::ItemStatus::Succeeded) => String::new(),
        };
        println!("  {} {} {}", status_symbol(&update.status), update.name, detail.dimmed());
    }
    println!();
    print_breakdown(&report.breakdown());
    Ok(())
}

/// Run the source status command
pub fn run_source_status(ws: &Workspace) -> Result<()> {
    println!("{}", "Agent Source Status".bold());
    println!();

    for status in sources::source_status(ws)? {
        println!("  {}", status.name.cyan());
        match &status.git {
            GitState::NotEnabled => println!("    Git: {}", "not enabled".dimmed()),
            GitState::Clean => println!("    Git: {} clean", "✓".green()),
            GitState::Error(message) => println!("    Git: {} {}", "error".red(), message),
            GitState::Dirty(lines) => {
                println!("    Git: {} {} uncommitted changes", "⚠".yellow(), lines.len());
                for line in lines.iter().take(STATUS_PREVIEW_LINES) {
                    println!("      {line}");
                }
                if lines.len() > STATUS_PREVIEW_LINES {
                    println!("      ... and {} more", lines.len() - STATUS_PREVIEW_LINES);
                }
            }
        }
        println!();
    }
    Ok(())
}

/// Run the source remove command
pub fn run_source_remove(ws: &Workspace, name: &str) -> Result<()> {
    let removed = sources::remove_source(ws, name)?;
    println!("{} Removed source {}", "✓".green(), removed.name.cyan());
    println!(
        "  Files remain at {}. Delete them manually if no longer needed.",
        removed.path.display()
    );
    Ok(())
}

/// Run the source reconcile command
pub fn run_source_reconcile(ws: &Workspace, auto: bool, check_only: bool) -> Result<()> {
    let report = reconcile(ws)?;

    if report.is_clean() {
        println!("{} Config and sources directory agree", "✓".green());
        return Ok(());
    }

    if !report.untracked.is_empty() {
        println!("{}:", "Untracked sources".bold());
        for untracked in &report.untracked {
            let git = match (&untracked.git_remote, untracked.has_git) {
                (Some(remote), _) => remote.clone(),
                (None, true) => "git, no remote".to_string(),
                (None, false) => "no git".to_string(),
            };
            println!(
                "  {} {} ({} agents, {})",
                "?".yellow(),
                untracked.name.cyan(),
                untracked.agent_count,
                git.dimmed()
            );
        }
        println!();
    }

    if !report.orphaned.is_empty() {
        println!("{}:", "Orphaned config entries".bold());
        for name in &report.orphaned {
            println!("  {} {} (path missing, remove with {})", "!".red(), name, "cami source remove".cyan());
        }
        println!();
    }

    let mode = if check_only || report.untracked.is_empty() {
        FixMode::CheckOnly
    } else if auto {
        FixMode::Auto
    } else {
        FixMode::Manual(interactive::select_untracked(&report.untracked)?)
    };

    let added = apply_fix(ws, &report, &mode)?;
    for name in &added {
        println!("{} Registered {}", "✓".green(), name.cyan());
    }
    Ok(())
}

/// Run the source analyze command
pub fn run_source_analyze(ws: &Workspace, name: &str, json: bool) -> Result<()> {
    let config = ws.load_config()?;
    let source = config.get_source(name)?;
    let analysis = analyze_source(&source.name, &source.path)?;

    if json {
        return print_json(&analysis);
    }

    let verdict = if analysis.is_compliant {
        "compliant".green()
    } else {
        "needs normalization".yellow()
    };
    println!("{} ({} agents): {}", analysis.source_name.cyan().bold(), analysis.agent_count, verdict);
    for issue in &analysis.issues {
        println!("  {} {}: {}", "!".yellow(), issue.agent_file, issue.problems.join(", "));
    }
    if analysis.missing_ignore_file {
        println!("  {} missing .camiignore", "!".yellow());
    }
    Ok(())
}

/// Run the source normalize command
pub fn run_source_normalize(
    ws: &Workspace,
    name: &str,
    options: SourceNormalizationOptions,
) -> Result<()> {
    let config = ws.load_config()?;
    let source = config.get_source(name)?;
    let result = normalize_source(&source.name, &source.path, options)?;

    println!("{} Backup at {}", "✓".green(), result.backup_path.display());
    for change in &result.changes {
        println!("  {} {}", "+".green(), change);
    }
    println!("{} agents updated", result.agents_updated);
    Ok(())
}
