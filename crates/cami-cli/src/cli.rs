//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CAMI - Manage Claude Code agents across sources and projects
#[derive(Parser, Debug)]
#[command(name = "cami")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to ~/cami-workspace)
    #[arg(long, global = true, env = "CAMI_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize the workspace
    ///
    /// Creates the workspace directory, `sources/` and an empty config.yaml.
    /// A legacy ~/.cami.json is migrated if present.
    Init,

    /// List agents available from all sources
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Deploy agents into a project
    ///
    /// Examples:
    ///   cami deploy -a frontend,backend -l ~/projects/app
    ///   cami deploy -a frontend -l . --overwrite
    Deploy {
        /// Agent names, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        agents: Vec<String>,

        /// Target project directory
        #[arg(short, long)]
        location: PathBuf,

        /// Replace agent files that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Compare deployed agents in every location with the sources
    Scan {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Update the deployed agents section of a project's CLAUDE.md
    UpdateDocs {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        location: PathBuf,

        /// Heading of the managed section
        #[arg(long)]
        section: Option<String>,

        /// Print the result without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Find Claude projects under a directory
    Discover {
        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only projects with a .claude directory but no agents
        #[arg(long)]
        empty_only: bool,

        /// Only projects that have this agent deployed
        #[arg(long)]
        has_agent: Option<String>,

        /// Maximum directory depth (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_depth: usize,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Manage deploy locations
    #[command(subcommand)]
    Location(LocationAction),

    /// Manage agent sources
    ///
    /// Higher priority numbers win when two sources define the same agent.
    #[command(subcommand)]
    Source(SourceAction),

    /// Analyze and normalize projects
    #[command(subcommand)]
    Project(ProjectAction),

    /// Manage normalization backups
    #[command(subcommand)]
    Backup(BackupAction),
}

/// Deploy location actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LocationAction {
    /// List tracked locations
    List,
    /// Track a project directory
    Add {
        /// Unique name for the location
        name: String,
        /// Project directory
        path: PathBuf,
    },
    /// Stop tracking a location
    Remove {
        /// Location name
        name: String,
    },
}

/// Agent source actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SourceAction {
    /// Clone a git repository into sources/ and register it
    ///
    /// Examples:
    ///   cami source add git@github.com:company/agents.git
    ///   cami source add git@github.com:org/team.git --name team --priority 100
    Add {
        /// Git URL to clone
        url: String,

        /// Source name (derived from the URL if omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Priority (higher number wins, default 50)
        #[arg(short, long)]
        priority: Option<i32>,
    },

    /// List configured sources
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Pull git-backed sources
    Update {
        /// Only this source
        name: Option<String>,
    },

    /// Show git working tree status of each source
    Status,

    /// Remove a source from the config (files stay on disk)
    Remove {
        /// Source name
        name: String,
    },

    /// Register source directories the config does not know about
    Reconcile {
        /// Register every untracked source without asking
        #[arg(long, conflicts_with = "check_only")]
        auto: bool,

        /// Report only
        #[arg(long)]
        check_only: bool,
    },

    /// Check a source for missing metadata
    Analyze {
        /// Source name
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Add missing versions, descriptions and ignore file (backs up first)
    Normalize {
        /// Source name
        name: String,

        #[arg(long)]
        skip_versions: bool,

        #[arg(long)]
        skip_descriptions: bool,

        #[arg(long)]
        skip_ignore_file: bool,
    },
}

/// Project actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProjectAction {
    /// Report the normalization state of a project
    Analyze {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write a CAMI manifest for a project (backs up first)
    Normalize {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// minimal, standard or full
        #[arg(short, long, default_value = "minimal")]
        level: String,

        /// Agents to leave out of the manifest
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,

        /// Agents to mark as intentionally customized
        #[arg(long, value_delimiter = ',')]
        custom: Vec<String>,
    },
}

/// Backup actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// List backups of a directory
    List {
        /// Directory that was backed up
        target: PathBuf,
    },
    /// Replace a directory with one of its backups
    Restore {
        /// Backup directory
        backup: PathBuf,
        /// Directory to restore into
        target: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove all but the newest backups
    Cleanup {
        /// Directory that was backed up
        target: PathBuf,

        /// Number of backups to keep (0 = default of 3)
        #[arg(long, default_value_t = 0)]
        keep: usize,
    },
}
