//! pyproject.toml, requirements files and the uv lockfile

use std::collections::BTreeSet;

use stencil_fs::NormalizedPath;
use toml::Value;

use crate::context::PythonInstaller;

const MARKER_FILES: &[&str] = &["pyproject.toml", "setup.py", "setup.cfg", "requirements.txt", "Pipfile"];

#[derive(Debug, Default)]
pub(crate) struct PythonFacts {
    pub present: bool,
    pub dependencies: Vec<(String, String)>,
    pub installer: Option<PythonInstaller>,
    /// Keys of the `[tool]` table in pyproject.toml (`ruff`, `black`, ...)
    pub tool_sections: BTreeSet<String>,
}

pub(crate) fn detect(root: &NormalizedPath) -> PythonFacts {
    let has_requirements = !requirement_files(root).is_empty();
    let present = has_requirements || MARKER_FILES.iter().any(|f| root.join(f).is_file());
    if !present {
        return PythonFacts::default();
    }

    let mut facts = PythonFacts {
        present,
        ..PythonFacts::default()
    };

    if let Some(pyproject) = read_pyproject(&root.join("pyproject.toml")) {
        collect_pyproject(&pyproject, &mut facts.dependencies);
        if let Some(tools) = pyproject.get("tool").and_then(Value::as_table) {
            facts.tool_sections = tools.keys().cloned().collect();
        }
    }
    for file in requirement_files(root) {
        collect_requirements(&file, &mut facts.dependencies);
    }

    facts.installer = if root.join("uv.lock").is_file() || facts.tool_sections.contains("uv") {
        Some(PythonInstaller::Uv)
    } else {
        Some(PythonInstaller::Pip)
    };

    tracing::debug!(
        dependencies = facts.dependencies.len(),
        installer = ?facts.installer,
        "detected python project"
    );
    facts
}

fn read_pyproject(path: &NormalizedPath) -> Option<Value> {
    let text = match stencil_fs::io::read_text_opt(path) {
        Ok(text) => text?,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read pyproject.toml");
            return None;
        }
    };
    match toml::from_str::<Value>(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "malformed pyproject.toml, ignoring");
            None
        }
    }
}

fn collect_pyproject(doc: &Value, out: &mut Vec<(String, String)>) {
    let project = doc.get("project");

    let requirements = project
        .and_then(|p| p.get("dependencies"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    push_requirements(requirements, out);

    if let Some(extras) = project
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(Value::as_table)
    {
        for reqs in extras.values().filter_map(Value::as_array) {
            push_requirements(reqs.iter(), out);
        }
    }

    // PEP 735; `{ include-group = ".." }` entries are not strings and fall out
    if let Some(groups) = doc.get("dependency-groups").and_then(Value::as_table) {
        for reqs in groups.values().filter_map(Value::as_array) {
            push_requirements(reqs.iter(), out);
        }
    }

    if let Some(poetry) = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(Value::as_table)
    {
        for (name, spec) in poetry {
            if name == "python" {
                continue;
            }
            let version = match spec {
                Value::String(v) => v.clone(),
                Value::Table(t) => t
                    .get("version")
                    .and_then(Value::as_str)
                    .unwrap_or("*")
                    .to_string(),
                _ => "*".to_string(),
            };
            out.push((name.clone(), version));
        }
    }
}

fn push_requirements<'a>(reqs: impl Iterator<Item = &'a Value>, out: &mut Vec<(String, String)>) {
    out.extend(reqs.filter_map(Value::as_str).filter_map(parse_requirement));
}

/// Split a PEP 508 requirement into name and version specifier.
///
/// `requests[socks]>=2.31 ; python_version > "3.8"` yields
/// `("requests", ">=2.31")`. A bare name yields `"*"`.
pub(crate) fn parse_requirement(line: &str) -> Option<(String, String)> {
    let line = line.split(';').next()?.trim();
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(line.len());
    let name = &line[..end];
    if name.is_empty() {
        return None;
    }

    let mut rest = line[end..].trim_start();
    if rest.starts_with('[') {
        rest = rest.find(']').map(|i| rest[i + 1..].trim_start()).unwrap_or("");
    }
    let rest = rest.trim_start_matches('(').trim_end_matches(')').trim();
    let version = if rest.is_empty() || rest.starts_with('@') {
        "*".to_string()
    } else {
        rest.to_string()
    };
    Some((name.to_string(), version))
}

fn requirement_files(root: &NormalizedPath) -> Vec<NormalizedPath> {
    let Ok(entries) = std::fs::read_dir(root.to_native()) else {
        return Vec::new();
    };
    let mut files: Vec<NormalizedPath> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with("requirements") && name.ends_with(".txt"))
        .map(|name| root.join(&name))
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

fn collect_requirements(path: &NormalizedPath, out: &mut Vec<(String, String)>) {
    let text = match stencil_fs::io::read_text(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read requirements file");
            return;
        }
    };
    for line in text.lines() {
        let line = line.split(" #").next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(req) = parse_requirement(line) {
            out.push(req);
        }
    }
}
