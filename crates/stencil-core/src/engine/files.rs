//! Owned and managed files

use stencil_fs::RelPath;
use stencil_schema::FileDefinition;

use super::{Existing, Pass};
use crate::cache::ReconcileCache;

fn entries(defs: &std::collections::BTreeMap<RelPath, FileDefinition>) -> Vec<(RelPath, FileDefinition)> {
    defs.iter().map(|(p, d)| (p.clone(), d.clone())).collect()
}

/// Owned files always converge on the generated content.
pub(super) fn write_owned(pass: &mut Pass<'_>, cache: &mut ReconcileCache) {
    for (path, def) in entries(pass.schema.owned_files()) {
        let Some(desired) = pass.render(cache, &path, &def) else {
            continue;
        };
        match pass.read(&path) {
            Existing::Unreadable => {}
            Existing::Absent => pass.converge_file(&path, None, &desired),
            Existing::Present(current) => pass.converge_file(&path, Some(current.as_str()), &desired),
        }
    }
}

/// Managed files are written only where nothing exists yet.
pub(super) fn install_managed(pass: &mut Pass<'_>, cache: &mut ReconcileCache) {
    for (path, def) in entries(pass.schema.managed_files()) {
        let Some(desired) = pass.render(cache, &path, &def) else {
            continue;
        };
        match pass.read(&path) {
            Existing::Unreadable => {}
            Existing::Absent => pass.converge_file(&path, None, &desired),
            Existing::Present(current) if current == desired => {
                pass.converge_file(&path, Some(current.as_str()), &desired);
            }
            Existing::Present(_) => {
                tracing::info!(path = %path, "managed file exists with other content; left alone");
                pass.report.preserved.push(path.to_string());
            }
        }
    }
}

/// Managed files are replaced only while they still hold exactly what
/// stencil last wrote. Anything else counts as a customization.
pub(super) fn upgrade_managed(pass: &mut Pass<'_>, cache: &mut ReconcileCache) {
    for (path, def) in entries(pass.schema.managed_files()) {
        let Some(desired) = pass.render(cache, &path, &def) else {
            continue;
        };
        let current = match pass.read(&path) {
            Existing::Unreadable => continue,
            Existing::Absent => {
                pass.converge_file(&path, None, &desired);
                continue;
            }
            Existing::Present(current) => current,
        };

        let untouched = pass
            .ledger
            .file_checksum(&path)
            .is_some_and(|recorded| recorded == stencil_fs::compute_content_checksum(&current));

        if current == desired || untouched {
            pass.converge_file(&path, Some(current.as_str()), &desired);
        } else {
            tracing::info!(path = %path, "managed file customized; preserving");
            pass.report.preserved.push(path.to_string());
        }
    }
}

/// Delete deprecated files wherever they still exist.
pub(super) fn remove_deprecated(pass: &mut Pass<'_>) {
    let paths: Vec<RelPath> = pass.schema.deprecated_files().iter().cloned().collect();
    for path in &paths {
        if let Existing::Present(current) = pass.read(path)
            && pass.delete(path, Some(current.as_str()))
        {
            pass.report.deleted.push(path.to_string());
        }
        pass.ledger.forget_file(path);
    }
}

/// Remove owned and managed files left outside owned directories.
///
/// Owned files go unconditionally. Managed files, and files only the
/// ledger still remembers, go only when stencil created them and they
/// are unmodified since; anything else is preserved.
pub(super) fn remove_all(pass: &mut Pass<'_>) {
    let owned: Vec<RelPath> = pass.schema.owned_files().keys().cloned().collect();
    for path in &owned {
        if pass.schema.owning_directory(path).is_some() {
            continue;
        }
        if let Existing::Present(current) = pass.read(path)
            && pass.delete(path, Some(current.as_str()))
        {
            pass.report.deleted.push(path.to_string());
        }
        pass.ledger.forget_file(path);
    }

    let mut tracked: Vec<RelPath> = pass.schema.managed_files().keys().cloned().collect();
    for path in pass.ledger.files().keys() {
        let in_schema = pass.schema.file_kind(path).is_some();
        if !in_schema && pass.schema.owning_directory(path).is_none() {
            tracked.push(path.clone());
        }
    }

    for path in &tracked {
        let current = match pass.read(path) {
            Existing::Present(current) => current,
            Existing::Absent | Existing::Unreadable => {
                pass.ledger.forget_file(path);
                continue;
            }
        };
        let Some(recorded) = pass.ledger.file_checksum(path) else {
            tracing::debug!(path = %path, "not written by stencil; left in place");
            continue;
        };
        let unmodified = recorded == stencil_fs::compute_content_checksum(&current);

        if unmodified && pass.ledger.created_file(path) {
            if pass.delete(path, Some(current.as_str())) {
                pass.report.deleted.push(path.to_string());
            }
        } else if unmodified {
            tracing::debug!(path = %path, "file predates stencil; left in place");
            pass.report.unchanged.push(path.to_string());
        } else {
            tracing::info!(path = %path, "managed file customized; preserving");
            pass.report.preserved.push(path.to_string());
        }
        pass.ledger.forget_file(path);
    }
}
