//! Cargo.toml and cargo workspaces

use stencil_fs::NormalizedPath;
use toml::Value;

use crate::workspace::expand_members;

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

#[derive(Debug, Default)]
pub(crate) struct RustFacts {
    pub present: bool,
    pub dependencies: Vec<(String, String)>,
}

pub(crate) fn detect(root: &NormalizedPath) -> RustFacts {
    let path = root.join("Cargo.toml");
    if !path.is_file() {
        return RustFacts::default();
    }

    let mut facts = RustFacts {
        present: true,
        ..RustFacts::default()
    };
    let Some(manifest) = read_manifest(&path) else {
        return facts;
    };

    collect_dependencies(&manifest, &mut facts.dependencies);
    if let Some(workspace) = manifest.get("workspace") {
        collect_table(workspace.get("dependencies"), &mut facts.dependencies);

        let members: Vec<String> = workspace
            .get("members")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        for member in expand_members(root, &members) {
            if let Some(member_manifest) = read_manifest(&member.join("Cargo.toml")) {
                collect_dependencies(&member_manifest, &mut facts.dependencies);
            }
        }
    }

    tracing::debug!(dependencies = facts.dependencies.len(), "detected cargo project");
    facts
}

fn read_manifest(path: &NormalizedPath) -> Option<Value> {
    let text = match stencil_fs::io::read_text_opt(path) {
        Ok(text) => text?,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read Cargo.toml");
            return None;
        }
    };
    match toml::from_str::<Value>(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "malformed Cargo.toml, ignoring");
            None
        }
    }
}

fn collect_dependencies(manifest: &Value, out: &mut Vec<(String, String)>) {
    for table in DEPENDENCY_TABLES {
        collect_table(manifest.get(table), out);
    }
}

fn collect_table(table: Option<&Value>, out: &mut Vec<(String, String)>) {
    let Some(table) = table.and_then(Value::as_table) else {
        return;
    };
    for (name, spec) in table {
        let version = match spec {
            Value::String(v) => v.as_str(),
            Value::Table(t) => t.get("version").and_then(Value::as_str).unwrap_or("*"),
            _ => "*",
        };
        out.push((name.clone(), version.to_string()));
    }
}
