//! Core operations for the CAMI agent manager
//!
//! This crate implements everything the `cami` CLI and the `cami-mcp` server
//! expose:
//!
//! - **Agent records**: frontmatter parsing and priority-based aggregation
//!   across sources (higher priority wins, ties keep the first source)
//! - **Project analysis**: content-addressed state detection of deployed agents
//! - **Normalization**: backup-first rewrites of sources and projects
//! - **Manifests**: the per-project manifest and the central deployments index
//! - **Reconciliation**: detecting source directories the config does not know
//! - **Deployment and discovery**: writing agents into projects and scanning
//!   tracked locations
//!
//! # Architecture
//!
//! ```text
//!            cami-cli      cami-mcp
//!                \            /
//!                  cami-core
//!                      |
//!                   cami-fs
//! ```
//!
//! Every operation that reads config or manifests takes a [`Workspace`],
//! which bundles the stores and the git client for one workspace root.
//!
//! # Example
//!
//! ```ignore
//! use cami_core::{Workspace, load_agents_from_sources};
//!
//! fn example() -> cami_core::Result<()> {
//!     let ws = Workspace::resolve(None)?;
//!     let outcome = load_agents_from_sources(&ws.load_config()?.source_specs());
//!     println!("{} agents", outcome.agents.len());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod backup;
pub mod compliance;
pub mod config;
pub mod deploy;
pub mod discovery;
pub mod docs;
pub mod error;
pub mod git;
pub mod manifest;
pub mod normalize;
pub mod project;
pub mod reconcile;
pub mod report;
pub mod sources;
pub mod workspace;

pub use agent::{
    AgentRecord, AggregateOutcome, FailedSource, SourceSpec, SourcedAgent, load_agents,
    load_agents_from_sources, parse_agent_file, parse_agent_str,
};
pub use backup::{ArchiveAnalysis, BackupInfo, BackupManager, CleanupResult};
pub use compliance::{SourceAnalysis, SourceIssue, analyze_source};
pub use config::{AgentSource, Config, ConfigStore, DeployLocation, GitConfig};
pub use deploy::{DeployReport, DeployResult, DeployStatus, deploy_and_record};
pub use discovery::{
    DeploymentStatus, DiscoverOptions, LocationStatus, ProjectInfo, ScanReport,
    discover_projects, scan_all_locations,
};
pub use docs::{DocsUpdate, update_claude_md};
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use git::{GitClient, PullOutcome};
pub use manifest::{
    CentralManifest, DeployedAgent, ManifestStore, ProjectDeployment, ProjectManifest,
    ProjectState,
};
pub use normalize::{
    ProjectNormalizationLevel, ProjectNormalizationOptions, ProjectNormalizationResult,
    SourceNormalizationOptions, SourceNormalizationResult, normalize_project, normalize_source,
};
pub use project::{AgentAnalysis, ProjectAnalysis, Recommendations, analyze_project};
pub use reconcile::{FixMode, ReconcileReport, UntrackedSource, apply_fix, reconcile};
pub use report::{Breakdown, ItemStatus};
pub use sources::{GitState, SourceStatus, UpdateReport};
pub use workspace::Workspace;
