//! Whole-tree snapshots.
//!
//! Used to prove that install followed by uninstall leaves a project exactly
//! as it was: same paths, same bytes, nothing extra.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One entry in a [`TreeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Dir,
    File(String),
}

/// Every directory and file under a root, keyed by forward-slash relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    entries: BTreeMap<String, Entry>,
}

impl TreeSnapshot {
    /// Capture the tree under `root`. `.git` is skipped.
    ///
    /// File contents are read lossily so that diffs stay readable.
    pub fn capture(root: &Path) -> Self {
        let mut entries = BTreeMap::new();
        walk(root, "", &mut entries);
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.entries.contains_key(rel)
    }

    /// Assert two snapshots are identical, with a readable diff on failure.
    pub fn assert_same(&self, other: &TreeSnapshot) {
        pretty_assertions::assert_eq!(self.entries, other.entries);
    }
}

fn walk(dir: &Path, prefix: &str, out: &mut BTreeMap<String, Entry>) {
    let read = fs::read_dir(dir).unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
    for entry in read {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        if prefix.is_empty() && name == ".git" {
            continue;
        }
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            out.insert(rel.clone(), Entry::Dir);
            walk(&path, &rel, out);
        } else {
            let bytes = fs::read(&path).unwrap();
            out.insert(rel, Entry::File(String::from_utf8_lossy(&bytes).into_owned()));
        }
    }
}
