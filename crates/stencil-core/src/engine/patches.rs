//! Marker-based text patches

use stencil_fs::RelPath;
use stencil_merge::{PatchOutcome, UnpatchOutcome, patch_text, unpatch_text};
use stencil_schema::TextPatchDefinition;

use super::{Existing, Pass};

fn entries(pass: &Pass<'_>) -> Vec<(RelPath, TextPatchDefinition)> {
    pass.schema
        .text_patches()
        .iter()
        .map(|(p, d)| (p.clone(), d.clone()))
        .collect()
}

pub(super) fn patch_all(pass: &mut Pass<'_>) {
    for (path, patch) in entries(pass) {
        let existing = match pass.read(&path) {
            Existing::Unreadable => continue,
            Existing::Absent => None,
            Existing::Present(text) => Some(text),
        };

        match patch_text(existing.as_deref(), &patch) {
            PatchOutcome::AlreadyApplied => pass.report.unchanged.push(path.to_string()),
            PatchOutcome::SkippedMissing => {
                tracing::debug!(path = %path, "patch target absent; skipped");
            }
            PatchOutcome::Patched(patched) => {
                if !pass.write(&path, existing.as_deref(), &patched) {
                    continue;
                }
                if existing.as_deref().is_some_and(|text| patch.needs_separator(text)) {
                    pass.ledger.record_patch_separator(&path);
                }
                if existing.is_none() {
                    pass.ledger.record_created_file(&path);
                    pass.report.created.push(path.to_string());
                } else {
                    pass.report.updated.push(path.to_string());
                }
            }
        }
    }
}

/// Take out exactly the block each patch inserted.
pub(super) fn unpatch_all(pass: &mut Pass<'_>) {
    for (path, patch) in entries(pass) {
        let text = match pass.read(&path) {
            Existing::Present(text) => text,
            Existing::Absent | Existing::Unreadable => continue,
        };

        let separated = pass.ledger.patch_separator(&path);
        match unpatch_text(&text, &patch, separated) {
            UnpatchOutcome::NotApplied => {}
            UnpatchOutcome::Modified => {
                pass.report
                    .warn(&path, "patched block was edited; left in place");
                pass.report.preserved.push(path.to_string());
            }
            UnpatchOutcome::Removed(rest) if rest.is_empty() && pass.ledger.created_file(&path) => {
                if pass.delete(&path, Some(text.as_str())) {
                    pass.ledger.forget_file(&path);
                    pass.report.deleted.push(path.to_string());
                }
            }
            UnpatchOutcome::Removed(rest) => {
                if pass.write(&path, Some(text.as_str()), &rest) {
                    pass.ledger.forget_file(&path);
                    pass.report.updated.push(path.to_string());
                }
            }
        }
    }
}
