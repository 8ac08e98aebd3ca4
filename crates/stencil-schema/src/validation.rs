//! Load-time checks that catch schema authoring mistakes

use std::collections::BTreeMap;

use stencil_fs::RelPath;

use crate::schema::{DirectoryKind, FileKind};
use crate::{Error, Result, Schema};

pub(crate) fn validate(schema: &Schema) -> Result<()> {
    let files = file_categories(schema)?;
    let dirs = directory_categories(schema)?;

    for (path, kind) in &files {
        if let Some(dir_kind) = dirs.get(path) {
            return Err(Error::DirectoryConflict {
                path: path.to_string(),
                first: dir_kind.label(),
                second: kind.label(),
            });
        }
    }

    check_deprecations(schema, &files, &dirs)?;
    check_merge_keys(schema)?;
    check_patch_markers(schema)
}

fn file_categories(schema: &Schema) -> Result<BTreeMap<&RelPath, FileKind>> {
    let all = schema
        .owned_files
        .keys()
        .map(|p| (p, FileKind::Owned))
        .chain(schema.managed_files.keys().map(|p| (p, FileKind::Managed)))
        .chain(schema.json_merges.keys().map(|p| (p, FileKind::JsonMerge)))
        .chain(schema.text_patches.keys().map(|p| (p, FileKind::TextPatch)));

    let mut seen = BTreeMap::new();
    for (path, kind) in all {
        if let Some(first) = seen.insert(path, kind) {
            return Err(Error::DuplicatePath {
                path: path.to_string(),
                first: first.label(),
                second: kind.label(),
            });
        }
    }
    Ok(seen)
}

fn directory_categories(schema: &Schema) -> Result<BTreeMap<&RelPath, DirectoryKind>> {
    let mut seen = BTreeMap::new();
    for (path, kind) in schema.directories() {
        if let Some(first) = seen.insert(path, kind) {
            return Err(Error::DirectoryConflict {
                path: path.to_string(),
                first: first.label(),
                second: kind.label(),
            });
        }
    }
    Ok(seen)
}

fn check_deprecations(
    schema: &Schema,
    files: &BTreeMap<&RelPath, FileKind>,
    dirs: &BTreeMap<&RelPath, DirectoryKind>,
) -> Result<()> {
    for path in &schema.deprecated_files {
        if let Some(kind) = files.get(path) {
            return Err(Error::DeprecatedConflict {
                path: path.to_string(),
                category: kind.label(),
            });
        }
    }

    // A live path inside a deprecated directory would be deleted right after
    // being declared.
    for deprecated in &schema.deprecated_directories {
        if let Some((path, kind)) = dirs.iter().find(|(p, _)| p.is_within(deprecated)) {
            return Err(Error::DeprecatedConflict {
                path: path.to_string(),
                category: kind.label(),
            });
        }
        if let Some((path, kind)) = files.iter().find(|(p, _)| p.is_within(deprecated)) {
            return Err(Error::DeprecatedConflict {
                path: path.to_string(),
                category: kind.label(),
            });
        }
    }
    Ok(())
}

fn check_merge_keys(schema: &Schema) -> Result<()> {
    for (path, def) in &schema.json_merges {
        let keys = def.declared_keys();
        for (i, first) in keys.iter().enumerate() {
            for second in &keys[i + 1..] {
                if first.is_prefix_of(second) || second.is_prefix_of(first) {
                    return Err(Error::OverlappingKeys {
                        path: path.to_string(),
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_patch_markers(schema: &Schema) -> Result<()> {
    for (path, patch) in &schema.text_patches {
        if patch.marker.is_empty() || !patch.content.contains(&patch.marker) {
            return Err(Error::MarkerNotInContent {
                path: path.to_string(),
                marker: patch.marker.clone(),
            });
        }
    }
    Ok(())
}
