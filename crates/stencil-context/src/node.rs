//! package.json, npm/yarn/pnpm workspaces and lockfiles

use serde_json::Value;
use stencil_fs::NormalizedPath;

use crate::context::JsPackageManager;
use crate::workspace::expand_members;

const DEPENDENCY_TABLES: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

#[derive(Debug, Default)]
pub(crate) struct NodeFacts {
    pub present: bool,
    pub typescript: bool,
    /// In discovery order: root package first, then workspace packages sorted by path
    pub dependencies: Vec<(String, String)>,
    pub package_manager: Option<JsPackageManager>,
}

pub(crate) fn detect(root: &NormalizedPath) -> NodeFacts {
    let manifest_path = root.join("package.json");
    if !manifest_path.is_file() {
        return NodeFacts::default();
    }

    let mut facts = NodeFacts {
        present: true,
        ..NodeFacts::default()
    };

    let manifest = read_manifest(&manifest_path);
    let mut member_patterns = Vec::new();
    if let Some(manifest) = &manifest {
        collect_dependencies(manifest, &mut facts.dependencies);
        member_patterns.extend(workspace_patterns(manifest));
    }
    member_patterns.extend(pnpm_workspace_patterns(root));

    for member in expand_members(root, &member_patterns) {
        if let Some(manifest) = read_manifest(&member.join("package.json")) {
            collect_dependencies(&manifest, &mut facts.dependencies);
        }
    }

    facts.typescript = root.join("tsconfig.json").is_file()
        || facts.dependencies.iter().any(|(name, _)| name == "typescript");
    facts.package_manager = detect_package_manager(root, manifest.as_ref());

    tracing::debug!(
        dependencies = facts.dependencies.len(),
        typescript = facts.typescript,
        package_manager = ?facts.package_manager,
        "detected javascript project"
    );
    facts
}

fn read_manifest(path: &NormalizedPath) -> Option<Value> {
    let text = match stencil_fs::io::read_text_opt(path) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read package.json");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            tracing::warn!(path = %path, "package.json is not an object, ignoring");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "malformed package.json, ignoring");
            None
        }
    }
}

fn collect_dependencies(manifest: &Value, out: &mut Vec<(String, String)>) {
    for table in DEPENDENCY_TABLES {
        let Some(deps) = manifest.get(table).and_then(Value::as_object) else {
            continue;
        };
        for (name, version) in deps {
            let version = version.as_str().unwrap_or("*");
            out.push((name.clone(), version.to_string()));
        }
    }
}

/// `workspaces` is either an array or `{ "packages": [...] }` (yarn classic).
fn workspace_patterns(manifest: &Value) -> Vec<String> {
    let list = match manifest.get("workspaces") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => match map.get("packages") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn pnpm_workspace_patterns(root: &NormalizedPath) -> Vec<String> {
    #[derive(serde::Deserialize)]
    struct PnpmWorkspace {
        #[serde(default)]
        packages: Vec<String>,
    }

    let path = root.join("pnpm-workspace.yaml");
    let text = match stencil_fs::io::read_text_opt(&path) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read pnpm-workspace.yaml");
            return Vec::new();
        }
    };
    match serde_yaml::from_str::<PnpmWorkspace>(&text) {
        Ok(ws) => ws.packages,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "malformed pnpm-workspace.yaml, ignoring");
            Vec::new()
        }
    }
}

fn detect_package_manager(root: &NormalizedPath, manifest: Option<&Value>) -> Option<JsPackageManager> {
    let by_lockfile = [
        ("pnpm-lock.yaml", JsPackageManager::Pnpm),
        ("yarn.lock", JsPackageManager::Yarn),
        ("bun.lock", JsPackageManager::Bun),
        ("bun.lockb", JsPackageManager::Bun),
        ("package-lock.json", JsPackageManager::Npm),
    ];
    if let Some((_, pm)) = by_lockfile
        .iter()
        .find(|(lockfile, _)| root.join(lockfile).is_file())
    {
        return Some(*pm);
    }

    // corepack's "packageManager": "pnpm@9.1.0"
    let declared = manifest?.get("packageManager")?.as_str()?;
    match declared.split('@').next()? {
        "pnpm" => Some(JsPackageManager::Pnpm),
        "yarn" => Some(JsPackageManager::Yarn),
        "bun" => Some(JsPackageManager::Bun),
        "npm" => Some(JsPackageManager::Npm),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dependency_tables_are_read_in_order() {
        let manifest = json!({
            "devDependencies": {"eslint": "^9.0.0"},
            "dependencies": {"react": "^18.0.0"},
        });
        let mut out = Vec::new();
        collect_dependencies(&manifest, &mut out);
        assert_eq!(out[0].0, "react");
        assert_eq!(out[1].0, "eslint");
    }

    #[test]
    fn yarn_classic_workspaces_object() {
        let manifest = json!({"workspaces": {"packages": ["packages/*"]}});
        assert_eq!(workspace_patterns(&manifest), vec!["packages/*".to_string()]);
    }
}
