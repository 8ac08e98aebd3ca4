//! Owned keys inside user JSON files

use serde_json::Value;
use stencil_fs::RelPath;
use stencil_merge::{
    JsonStyle, KeyPath, created_parents, is_effectively_empty, parse_document, prune_empty_objects,
};
use stencil_schema::JsonMergeDefinition;

use super::{Existing, Pass};

fn entries(pass: &Pass<'_>) -> Vec<(RelPath, JsonMergeDefinition)> {
    pass.schema
        .json_merges()
        .iter()
        .map(|(p, d)| (p.clone(), d.clone()))
        .collect()
}

/// Parse a target, reporting malformed documents as warnings.
fn parse(pass: &mut Pass<'_>, path: &RelPath, text: &str) -> Option<Value> {
    match parse_document(text) {
        Ok(doc) => Some(doc),
        Err(e) => {
            pass.report
                .warn(path, format!("left untouched, not a JSON object: {e}"));
            None
        }
    }
}

fn render(pass: &mut Pass<'_>, path: &RelPath, style: &JsonStyle, doc: &Value) -> Option<String> {
    match style.render(doc) {
        Ok(text) => Some(text),
        Err(e) => {
            pass.report.error(path, e);
            None
        }
    }
}

/// Merge owned keys into every target.
pub(super) fn merge_all(pass: &mut Pass<'_>) {
    for (path, def) in entries(pass) {
        let existing = match pass.read(&path) {
            Existing::Unreadable => continue,
            Existing::Absent if def.skips_if_missing() => {
                tracing::debug!(path = %path, "merge target absent; skipped");
                continue;
            }
            Existing::Absent => None,
            Existing::Present(text) => Some(text),
        };
        let text = existing.as_deref().unwrap_or_default();
        let Some(doc) = parse(pass, &path, text) else {
            continue;
        };

        let merged = match def.apply_merge(&doc, pass.ctx) {
            Ok(merged) => merged,
            Err(e) => {
                pass.report.warn(&path, format!("merge skipped: {e}"));
                continue;
            }
        };
        for key in def.missing_keys(&merged, pass.ctx) {
            pass.report
                .warn(&path, format!("key '{key}' is blocked by an existing non-object value"));
        }
        let parents: Vec<String> = created_parents(&doc, &merged, &def.declared_keys())
            .iter()
            .map(KeyPath::to_string)
            .collect();

        match existing {
            None if is_effectively_empty(&merged) => {
                tracing::debug!(path = %path, "nothing to merge; file not created");
            }
            None => {
                let Some(out) = render(pass, &path, &JsonStyle::default(), &merged) else {
                    continue;
                };
                if pass.write(&path, None, &out) {
                    pass.ledger.record_created_file(&path);
                    pass.ledger.record_json_parents(&path, parents);
                    pass.report.created.push(path.to_string());
                }
            }
            Some(_) if merged == doc => pass.report.unchanged.push(path.to_string()),
            Some(text) => {
                let Some(out) = render(pass, &path, &JsonStyle::detect(&text), &merged) else {
                    continue;
                };
                if pass.write(&path, Some(text.as_str()), &out) {
                    pass.ledger.record_json_original(&path, &text);
                    pass.ledger.record_json_parents(&path, parents);
                    pass.report.updated.push(path.to_string());
                }
            }
        }
    }
}

/// Remove owned keys from every target that exists.
///
/// Parent objects go only if the merge created them. When what is left
/// equals the document as it was before stencil first touched it, the
/// original text is written back byte for byte. Otherwise a file is
/// deleted once nothing meaningful remains, provided the entry asks for
/// that or stencil created the file in the first place.
pub(super) fn unmerge_all(pass: &mut Pass<'_>) {
    for (path, def) in entries(pass) {
        let text = match pass.read(&path) {
            Existing::Present(text) => text,
            Existing::Absent | Existing::Unreadable => continue,
        };
        let Some(doc) = parse(pass, &path, &text) else {
            continue;
        };
        let mut unmerged = match def.apply_unmerge(&doc, pass.ctx) {
            Ok(unmerged) => unmerged,
            Err(e) => {
                pass.report.warn(&path, format!("unmerge skipped: {e}"));
                continue;
            }
        };

        let record = pass.ledger.json_record(&path).cloned().unwrap_or_default();
        let parents: Vec<KeyPath> = record
            .created_parents
            .iter()
            .filter_map(|p| KeyPath::parse(p).ok())
            .collect();
        prune_empty_objects(&mut unmerged, &parents);

        let restored = record
            .original
            .filter(|original| parse_document(original).is_ok_and(|before| before == unmerged));
        let removable = def.removes_file_if_empty() || pass.ledger.created_file(&path);
        if restored.is_none() && removable && is_effectively_empty(&unmerged) {
            if pass.delete(&path, Some(text.as_str())) {
                pass.ledger.forget_file(&path);
                pass.report.deleted.push(path.to_string());
            }
            continue;
        }

        let out = match restored {
            Some(original) => original,
            None if unmerged == doc => text.clone(),
            None => match render(pass, &path, &JsonStyle::detect(&text), &unmerged) {
                Some(out) => out,
                None => continue,
            },
        };

        if out == text {
            pass.report.unchanged.push(path.to_string());
        } else if pass.write(&path, Some(text.as_str()), &out) {
            pass.ledger.forget_file(&path);
            pass.report.updated.push(path.to_string());
        }
    }
}
