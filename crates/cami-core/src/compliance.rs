//! Source compliance analysis
//!
//! A compliant source has a `.camiignore` file and every agent carries a
//! name, version and description. Analysis never modifies the source.

use std::path::{Path, PathBuf};

use cami_fs::CamiPath;
use serde::Serialize;

use crate::agent::load_agents;
use crate::{Error, Result};

/// Problems found in one agent file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceIssue {
    pub agent_file: String,
    pub problems: Vec<String>,
}

/// Compliance report for a source directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAnalysis {
    pub source_name: String,
    pub path: PathBuf,
    pub is_compliant: bool,
    pub agent_count: usize,
    pub issues: Vec<SourceIssue>,
    pub missing_ignore_file: bool,
}

/// Check a source for missing agent metadata and a missing ignore file.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` does not exist.
pub fn analyze_source(name: &str, path: &Path) -> Result<SourceAnalysis> {
    if !path.exists() {
        return Err(Error::not_found("source path", path));
    }

    let agents = load_agents(path)?;
    let issues: Vec<SourceIssue> = agents
        .iter()
        .filter_map(|agent| {
            let mut problems = Vec::new();
            if agent.version.is_empty() {
                problems.push("missing version".to_string());
            }
            if agent.description.is_empty() {
                problems.push("missing description".to_string());
            }
            if agent.name.is_empty() {
                problems.push("missing name".to_string());
            }
            (!problems.is_empty()).then(|| SourceIssue {
                agent_file: agent.file_name(),
                problems,
            })
        })
        .collect();

    let missing_ignore_file = !path.join(CamiPath::IgnoreFile).exists();

    Ok(SourceAnalysis {
        source_name: name.to_string(),
        path: path.to_path_buf(),
        is_compliant: issues.is_empty() && !missing_ignore_file,
        agent_count: agents.len(),
        issues,
        missing_ignore_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compliant_source() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("a.md"),
            "---\nname: a\nversion: 1.0.0\ndescription: A\n---\n",
        )
        .unwrap();
        fs::write(temp.path().join(".camiignore"), "README.md\n").unwrap();

        let analysis = analyze_source("mine", temp.path()).unwrap();
        assert!(analysis.is_compliant);
        assert_eq!(analysis.agent_count, 1);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_issues_listed_in_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bare.md"), "---\nname: bare\n---\nBody\n").unwrap();
        fs::write(
            temp.path().join("half.md"),
            "---\nname: half\nversion: 2.0.0\n---\n",
        )
        .unwrap();

        let analysis = analyze_source("mine", temp.path()).unwrap();

        assert!(!analysis.is_compliant);
        assert!(analysis.missing_ignore_file);
        assert_eq!(
            analysis.issues,
            vec![
                SourceIssue {
                    agent_file: "bare.md".into(),
                    problems: vec!["missing version".into(), "missing description".into()],
                },
                SourceIssue {
                    agent_file: "half.md".into(),
                    problems: vec!["missing description".into()],
                },
            ]
        );
    }

    #[test]
    fn test_missing_ignore_file_alone_is_non_compliant() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("a.md"),
            "---\nname: a\nversion: 1.0.0\ndescription: A\n---\n",
        )
        .unwrap();

        let analysis = analyze_source("mine", temp.path()).unwrap();
        assert!(analysis.issues.is_empty());
        assert!(!analysis.is_compliant);
    }

    #[test]
    fn test_missing_path() {
        let err = analyze_source("ghost", Path::new("/nonexistent/source")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
