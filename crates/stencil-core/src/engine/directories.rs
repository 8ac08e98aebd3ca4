//! Directory categories

use stencil_fs::RelPath;

use super::{Pass, dir_label};

/// Create every declared directory, parents first.
pub(super) fn create_all(pass: &mut Pass<'_>) {
    let dirs: Vec<RelPath> = pass
        .schema
        .directories()
        .into_iter()
        .map(|(dir, _)| dir.clone())
        .collect();
    for dir in &dirs {
        pass.ensure_dir(dir);
    }
}

pub(super) fn remove_deprecated(pass: &mut Pass<'_>) {
    let dirs: Vec<RelPath> = pass.schema.deprecated_directories().iter().cloned().collect();
    remove_trees(pass, &dirs);
}

/// Remove owned directories with everything in them.
pub(super) fn remove_owned(pass: &mut Pass<'_>) {
    let dirs: Vec<RelPath> = pass.schema.owned_directories().iter().cloned().collect();
    remove_trees(pass, &dirs);
}

fn remove_trees(pass: &mut Pass<'_>, dirs: &[RelPath]) {
    // Sorted sets put a parent before its children, so nested entries are
    // already gone by the time they come up.
    for dir in dirs {
        if !pass.is_dir(dir) {
            continue;
        }
        if pass.delete_tree(dir) {
            pass.ledger.forget_tree(dir);
            pass.report.deleted.push(dir_label(dir));
        }
    }
}

/// Remove directories stencil created that are now empty, deepest first.
pub(super) fn prune_created(pass: &mut Pass<'_>) {
    let mut dirs: Vec<RelPath> = pass.ledger.created_directories().iter().cloned().collect();
    dirs.sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| b.cmp(a)));

    for dir in &dirs {
        if !pass.is_dir(dir) {
            pass.ledger.forget_directory(dir);
            continue;
        }
        if pass.delete_dir_if_empty(dir) {
            pass.ledger.forget_directory(dir);
            pass.report.deleted.push(dir_label(dir));
        } else {
            tracing::debug!(path = %dir, "created directory kept; not empty");
        }
    }
}
