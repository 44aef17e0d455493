//! Loading agents from source directories
//!
//! A source is a directory tree of `*.md` agent files. Files that fail to
//! parse are logged and skipped so one broken agent never hides the rest.
//! When several sources are combined, each agent name resolves to the record
//! from the source with the highest priority.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{AgentRecord, parse_agent_file};
use crate::{Error, Result};

/// A source directory participating in aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpec {
    pub name: String,
    pub path: PathBuf,
    /// Higher number wins on name conflict
    pub priority: i32,
}

impl SourceSpec {
    /// A source named after its directory.
    pub fn new(path: impl Into<PathBuf>, priority: i32) -> Self {
        let path = path.into();
        Self {
            name: cami_fs::file_name_str(&path),
            path,
            priority,
        }
    }

    pub fn named(name: impl Into<String>, path: impl Into<PathBuf>, priority: i32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            priority,
        }
    }
}

/// An agent together with the source it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedAgent {
    #[serde(flatten)]
    pub record: AgentRecord,
    pub source: String,
    pub priority: i32,
}

/// A source that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSource {
    pub path: PathBuf,
    pub message: String,
}

/// Result of loading several sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateOutcome {
    /// One entry per distinct agent name, sorted by name
    pub agents: Vec<SourcedAgent>,
    pub loaded_sources: Vec<PathBuf>,
    pub failed_sources: Vec<FailedSource>,
}

impl AggregateOutcome {
    pub fn records(&self) -> impl Iterator<Item = &AgentRecord> {
        self.agents.iter().map(|a| &a.record)
    }

    pub fn into_records(self) -> Vec<AgentRecord> {
        self.agents.into_iter().map(|a| a.record).collect()
    }

    pub fn find(&self, name: &str) -> Option<&SourcedAgent> {
        self.agents
            .binary_search_by(|a| a.record.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.agents[i])
    }
}

/// Load every agent below `dir`.
///
/// Files are visited in file-name order. Hidden directories below the root
/// (such as `.git`) are not entered.
///
/// # Errors
///
/// Returns [`Error::SourceUnreadable`] when `dir` is missing or cannot be
/// listed. Individual files that fail to parse are skipped.
pub fn load_agents(dir: &Path) -> Result<Vec<AgentRecord>> {
    if !dir.is_dir() {
        return Err(Error::SourceUnreadable {
            path: dir.to_path_buf(),
            message: "not a directory".into(),
        });
    }

    let mut agents = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::SourceUnreadable {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!(source = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        match parse_agent_file(path) {
            Ok(mut agent) => {
                agent.category = category_of(dir, path);
                agents.push(agent);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping agent file"),
        }
    }

    debug!(source = %dir.display(), count = agents.len(), "Loaded agents");
    Ok(agents)
}

/// Load and merge agents from several sources.
///
/// A source that fails to load is recorded in the outcome and does not stop
/// the others. On a name clash the strictly higher priority wins; equal
/// priorities keep the first source in list order.
pub fn load_agents_from_sources(sources: &[SourceSpec]) -> AggregateOutcome {
    let mut winners: BTreeMap<String, SourcedAgent> = BTreeMap::new();
    let mut outcome = AggregateOutcome::default();

    for source in sources {
        let agents = match load_agents(&source.path) {
            Ok(agents) => agents,
            Err(e) => {
                warn!(source = %source.path.display(), error = %e, "Failed to load agent source");
                outcome.failed_sources.push(FailedSource {
                    path: source.path.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        outcome.loaded_sources.push(source.path.clone());

        for record in agents {
            let replace = winners
                .get(&record.name)
                .is_none_or(|current| source.priority > current.priority);
            if replace {
                winners.insert(
                    record.name.clone(),
                    SourcedAgent {
                        record,
                        source: source.name.clone(),
                        priority: source.priority,
                    },
                );
            }
        }
    }

    outcome.agents = winners.into_values().collect();
    outcome
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn category_of(root: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .and_then(|rel| rel.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}
