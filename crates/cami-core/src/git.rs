//! Thin wrapper over the `git` executable
//!
//! Exit status and stderr are the whole interface: a non-zero exit becomes
//! [`Error::Git`] with the arguments and trimmed stderr.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{Error, Result};

/// Result of a `git pull`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullOutcome {
    UpToDate,
    Updated,
}

#[derive(Debug, Clone)]
pub struct GitClient {
    program: String,
}

impl Default for GitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitClient {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use a different git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git and return its stdout and stderr.
    fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<(String, String)> {
        let mut command = Command::new(&self.program);
        if let Some(dir) = dir {
            command.arg("-C").arg(dir);
        }
        command.args(args);
        debug!(?args, dir = ?dir, "Running git");

        let output = command.output().map_err(|e| Error::Git {
            args: args.join(" "),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(Error::Git {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }

    /// Clone `url` into `dest`.
    pub fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(None, &["clone", url, &dest])?;
        Ok(())
    }

    pub fn pull(&self, dir: &Path) -> Result<PullOutcome> {
        let (stdout, stderr) = self.run(Some(dir), &["pull"])?;
        let output = stdout + &stderr;
        if output.contains("Already up to date") || output.contains("Already up-to-date") {
            Ok(PullOutcome::UpToDate)
        } else {
            Ok(PullOutcome::Updated)
        }
    }

    /// Changed paths as reported by `git status --porcelain`.
    pub fn status_porcelain(&self, dir: &Path) -> Result<Vec<String>> {
        let (stdout, _) = self.run(Some(dir), &["status", "--porcelain"])?;
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// URL of the `origin` remote, if any.
    pub fn remote_url(&self, dir: &Path) -> Option<String> {
        self.run(Some(dir), &["remote", "get-url", "origin"])
            .ok()
            .map(|(url, _)| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }
}
