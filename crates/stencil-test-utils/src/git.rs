//! Git repository fixtures at two realism levels.
//!
//! Choose the lowest-realism fixture that satisfies the test.

use std::fs;
use std::path::Path;

/// Creates a minimal `.git` directory structure without a real object store.
///
/// Enough for `git2::Repository::discover` to accept the directory.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git/refs/heads: {e}"));
    fs::create_dir_all(path.join(".git/objects"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git/objects: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises a real git repository using `git2`, with empty history.
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
