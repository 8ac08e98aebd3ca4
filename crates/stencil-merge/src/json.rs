//! Owned-key merging inside user JSON documents.
//!
//! Relies on serde_json's `preserve_order`: keys that stencil does not own
//! keep their position, new owned keys are appended at the end of their
//! parent object.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::{Error, KeyPath, Result};

/// Parse a JSON document whose root must be an object.
///
/// Blank input is treated as `{}`.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let value: Value = serde_json::from_str(text).map_err(|e| Error::Malformed {
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(Error::NotAnObject {
            path: "<root>".to_string(),
        });
    }
    Ok(value)
}

/// Pretty-print a document with a trailing newline.
pub fn render_document(value: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Layout of an existing document: single-line or indented, and whether
/// it ends in a newline.
///
/// Rewriting a user file keeps the layout the user chose instead of
/// reformatting the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStyle {
    indent: String,
    compact: bool,
    trailing_newline: bool,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            compact: false,
            trailing_newline: true,
        }
    }
}

impl JsonStyle {
    /// Take the indent of the first indented line, two spaces if none.
    ///
    /// A document written on one line stays on one line, unless it is a
    /// bare `{}` that says nothing about the user's preference.
    pub fn detect(text: &str) -> Self {
        let body = text.trim();
        let compact = !body.contains('\n') && body.len() > 2;
        let indent = text
            .lines()
            .skip(1)
            .map(|line| {
                line.chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect::<String>()
            })
            .find(|ws| !ws.is_empty())
            .unwrap_or_else(|| "  ".to_string());
        Self {
            indent,
            compact,
            trailing_newline: body.is_empty() || text.ends_with('\n'),
        }
    }

    pub fn render(&self, value: &Value) -> Result<String> {
        let mut out = if self.compact {
            serde_json::to_string(value)?
        } else {
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut serializer)?;
            String::from_utf8(buf).map_err(|e| Error::Malformed {
                message: e.to_string(),
            })?
        };
        if self.trailing_newline {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Get a value by key path. Numeric segments index into arrays.
pub fn get_path<'a>(value: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a value by key path, creating intermediate objects as needed.
///
/// Existing keys keep their position; new keys are appended.
///
/// # Errors
///
/// Returns [`Error::PathConflict`] when an intermediate segment holds a
/// non-object value. The document is left unchanged in that case.
pub fn set_path(value: &mut Value, path: &KeyPath, new_value: Value) -> Result<()> {
    let segments = path.segments();
    let mut current = value;
    for (depth, segment) in segments.iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| Error::PathConflict {
            path: path.to_string(),
            segment: path.prefix_display(depth),
        })?;
        if depth + 1 == segments.len() {
            map.insert(segment.clone(), new_value);
            return Ok(());
        }
        if let Some(existing) = map.get(segment)
            && !existing.is_object()
        {
            return Err(Error::PathConflict {
                path: path.to_string(),
                segment: path.prefix_display(depth + 1),
            });
        }
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}

/// Remove a value by key path and return it.
///
/// Only the addressed key goes. Parents are left in place even when the
/// removal empties them; see [`prune_empty_objects`].
pub fn remove_path(value: &mut Value, path: &KeyPath) -> Option<Value> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = value;
    for segment in parents {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    current.as_object_mut()?.shift_remove(last)
}

/// Parent objects of `keys` that exist in `after` but not in `before`.
///
/// These are the objects a merge had to create to hold its keys, the only
/// ones an unmerge may take away again.
pub fn created_parents(before: &Value, after: &Value, keys: &[KeyPath]) -> Vec<KeyPath> {
    let mut created: Vec<KeyPath> = Vec::new();
    for parent in keys.iter().flat_map(KeyPath::parents) {
        if created.contains(&parent) || get_path(before, &parent).is_some() {
            continue;
        }
        if get_path(after, &parent).is_some_and(Value::is_object) {
            created.push(parent);
        }
    }
    created
}

/// Remove each of `paths` that holds an empty object, deepest first, so a
/// parent emptied by pruning its child goes too. Returns how many went.
pub fn prune_empty_objects(value: &mut Value, paths: &[KeyPath]) -> usize {
    let mut ordered: Vec<&KeyPath> = paths.iter().collect();
    ordered.sort_by(|a, b| b.segments().len().cmp(&a.segments().len()));

    let mut pruned = 0;
    for path in ordered {
        let empty = get_path(value, path)
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty);
        if empty && remove_path(value, path).is_some() {
            pruned += 1;
        }
    }
    pruned
}

/// Whether a value carries no meaningful content: `null`, an empty array,
/// or an object whose values are all effectively empty.
pub fn is_effectively_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_effectively_empty),
        _ => false,
    }
}

/// Clip a merge function's output back onto `existing`.
///
/// The result equals `existing` except at the declared `keys`, where it
/// takes whatever `candidate` holds (or removes the key if `candidate`
/// lacks it). Keys outside the declared set are never introduced,
/// altered, or removed, however `candidate` was produced.
pub fn merge_json_keys(existing: &Value, keys: &[KeyPath], candidate: &Value) -> Result<Value> {
    clip_to_keys(existing, keys, candidate)
}

/// Clip an unmerge function's output back onto `existing`.
///
/// Same guarantees as [`merge_json_keys`]; owned keys absent from
/// `candidate` are removed. Their parents stay, since only the caller
/// knows which of them the merge created.
pub fn unmerge_json_keys(existing: &Value, keys: &[KeyPath], candidate: &Value) -> Result<Value> {
    clip_to_keys(existing, keys, candidate)
}

fn clip_to_keys(existing: &Value, keys: &[KeyPath], candidate: &Value) -> Result<Value> {
    if !existing.is_object() {
        return Err(Error::NotAnObject {
            path: "<root>".to_string(),
        });
    }

    let mut result = existing.clone();
    for key in keys {
        match get_path(candidate, key) {
            Some(wanted) => {
                if get_path(&result, key) != Some(wanted) {
                    set_path(&mut result, key, wanted.clone())?;
                }
            }
            None => {
                if remove_path(&mut result, key).is_some() {
                    tracing::trace!(key = %key, "owned key removed");
                }
            }
        }
    }
    Ok(result)
}
