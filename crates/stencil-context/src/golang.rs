//! go.mod

use stencil_fs::NormalizedPath;

#[derive(Debug, Default)]
pub(crate) struct GoFacts {
    pub present: bool,
    pub dependencies: Vec<(String, String)>,
}

pub(crate) fn detect(root: &NormalizedPath) -> GoFacts {
    let path = root.join("go.mod");
    let text = match stencil_fs::io::read_text_opt(&path) {
        Ok(Some(text)) => text,
        Ok(None) => return GoFacts::default(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot read go.mod");
            return GoFacts {
                present: true,
                dependencies: Vec::new(),
            };
        }
    };

    let dependencies = parse_requires(&text);
    tracing::debug!(dependencies = dependencies.len(), "detected go module");
    GoFacts {
        present: true,
        dependencies,
    }
}

/// Collect `require` directives, both single-line and parenthesized blocks.
pub(crate) fn parse_requires(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if in_block {
            if line == ")" {
                in_block = false;
            } else if let Some(dep) = module_version(line) {
                out.push(dep);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
            } else if let Some(dep) = module_version(rest) {
                out.push(dep);
            }
        }
    }
    out
}

fn module_version(line: &str) -> Option<(String, String)> {
    let mut parts = line.split_whitespace();
    let module = parts.next()?;
    let version = parts.next()?;
    Some((module.to_string(), version.to_string()))
}
