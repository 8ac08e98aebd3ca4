//! Workspace member expansion shared by the npm, pnpm and cargo readers.

use std::collections::BTreeSet;

use stencil_fs::NormalizedPath;

/// Expand workspace member patterns into existing member directories.
///
/// Supports literal directories and a single trailing `*` or `**`
/// segment (`packages/*`), which matches the immediate subdirectories.
/// Negated patterns (`!packages/legacy`) remove matches. The result is
/// sorted and never contains the root itself.
pub(crate) fn expand_members(root: &NormalizedPath, patterns: &[String]) -> Vec<NormalizedPath> {
    let mut included = BTreeSet::new();
    let mut excluded = BTreeSet::new();

    for pattern in patterns {
        let (negated, pattern) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        if pattern.is_empty() || pattern == "." {
            continue;
        }

        let matches = match pattern
            .strip_suffix("/**")
            .or_else(|| pattern.strip_suffix("/*"))
        {
            Some(parent) => list_subdirs(&root.join(parent)),
            None => {
                let dir = root.join(pattern);
                if dir.is_dir() { vec![dir] } else { Vec::new() }
            }
        };

        if negated {
            excluded.extend(matches);
        } else {
            included.extend(matches);
        }
    }

    included
        .into_iter()
        .filter(|dir| !excluded.contains(dir) && dir != root)
        .collect()
}

fn list_subdirs(dir: &NormalizedPath) -> Vec<NormalizedPath> {
    let Ok(entries) = std::fs::read_dir(dir.to_native()) else {
        return Vec::new();
    };
    let mut dirs: Vec<NormalizedPath> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            (!name.starts_with('.')).then(|| dir.join(name))
        })
        .collect();
    dirs.sort();
    dirs
}
