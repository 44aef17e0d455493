//! CAMI CLI
//!
//! The command-line interface for managing Claude Code agents.

mod cli;
mod commands;
mod error;
mod interactive;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cami_core::Workspace;
use cli::{BackupAction, Cli, Commands, LocationAction, ProjectAction, SourceAction};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{} tracing subscriber already set", "warning:".yellow().bold());
        }
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        println!("{} Claude agent manager", "cami".green().bold());
        println!();
        println!("Run {} for available commands.", "cami --help".cyan());
        return Ok(());
    };

    let ws = Workspace::resolve(cli.workspace.as_deref())?;
    execute_command(&ws, command)
}

fn execute_command(ws: &Workspace, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => {
            let legacy = dirs::home_dir().map(|home| home.join(commands::LEGACY_CONFIG_FILE));
            commands::run_init(ws, legacy.as_deref())
        }
        Commands::List { json } => commands::run_list(ws, json),
        Commands::Deploy {
            agents,
            location,
            overwrite,
        } => commands::run_deploy(ws, &agents, &location, overwrite),
        Commands::Scan { json } => commands::run_scan(ws, json),
        Commands::UpdateDocs {
            location,
            section,
            dry_run,
        } => commands::run_update_docs(&location, section.as_deref(), dry_run),
        Commands::Discover {
            path,
            empty_only,
            has_agent,
            max_depth,
            json,
        } => commands::run_discover(&path, empty_only, has_agent, max_depth, json),
        Commands::Location(action) => match action {
            LocationAction::List => commands::run_location_list(ws),
            LocationAction::Add { name, path } => commands::run_location_add(ws, &name, &path),
            LocationAction::Remove { name } => commands::run_location_remove(ws, &name),
        },
        Commands::Source(action) => cmd_source(ws, action),
        Commands::Project(action) => match action {
            ProjectAction::Analyze { path, json } => commands::run_project_analyze(ws, &path, json),
            ProjectAction::Normalize {
                path,
                level,
                skip,
                custom,
            } => commands::run_project_normalize(ws, &path, &level, skip, custom),
        },
        Commands::Backup(action) => match action {
            BackupAction::List { target } => commands::run_backup_list(&target),
            BackupAction::Restore {
                backup,
                target,
                yes,
            } => commands::run_backup_restore(&backup, &target, yes),
            BackupAction::Cleanup { target, keep } => commands::run_backup_cleanup(&target, keep),
        },
    }
}

fn cmd_source(ws: &Workspace, action: SourceAction) -> Result<()> {
    match action {
        SourceAction::Add {
            url,
            name,
            priority,
        } => commands::run_source_add(ws, &url, name.as_deref(), priority),
        SourceAction::List { json } => commands::run_source_list(ws, json),
        SourceAction::Update { name } => commands::run_source_update(ws, name.as_deref()),
        SourceAction::Status => commands::run_source_status(ws),
        SourceAction::Remove { name } => commands::run_source_remove(ws, &name),
        SourceAction::Reconcile { auto, check_only } => {
            commands::run_source_reconcile(ws, auto, check_only)
        }
        SourceAction::Analyze { name, json } => commands::run_source_analyze(ws, &name, json),
        SourceAction::Normalize {
            name,
            skip_versions,
            skip_descriptions,
            skip_ignore_file,
        } => commands::run_source_normalize(
            ws,
            &name,
            cami_core::SourceNormalizationOptions {
                add_versions: !skip_versions,
                add_descriptions: !skip_descriptions,
                create_ignore_file: !skip_ignore_file,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cami_fs::WorkspaceLayout;
    use tempfile::TempDir;

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_execute_init_then_list() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::open(WorkspaceLayout::at(temp.path()));

        assert!(commands::run_init(&ws, None).is_ok());
        assert!(execute_command(&ws, Commands::List { json: true }).is_ok());
        assert!(execute_command(&ws, Commands::Location(LocationAction::List)).is_ok());
    }
}
