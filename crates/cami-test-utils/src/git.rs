//! Git repository fixtures.

use std::fs;
use std::path::Path;

/// Creates a `.git` directory without a real repository behind it.
///
/// Enough for code that only checks for the marker.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises a real, empty git repository using `git2`.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository whose `origin` remote points at `url`.
///
/// # Panics
/// Panics if the repository or the remote cannot be created.
pub fn git_repo_with_origin(path: &Path, url: &str) -> git2::Repository {
    let repo = real_git_repo(path);
    repo.remote("origin", url)
        .unwrap_or_else(|e| panic!("git_repo_with_origin: failed to add origin {url}: {e}"));
    repo
}
