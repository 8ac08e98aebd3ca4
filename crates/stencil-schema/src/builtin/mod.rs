//! The schema shipped with the `stencil` binary

mod generators;
mod templates;

use serde_json::{Value, json};
use stencil_context::ProjectContext;
use stencil_merge::{KeyPath, TextPatch, remove_path, set_path};

use crate::{
    Ecosystem, Error, FileDefinition, JsonMergeDefinition, PackageGroup, Predicate, Result, Schema,
};

/// Schema revision of the built-in schema.
pub const VERSION: &str = "1.0.0";

fn key(target: &str, raw: &str) -> Result<KeyPath> {
    KeyPath::parse(raw).map_err(|source| Error::InvalidKeyPath {
        path: target.to_string(),
        source,
    })
}

/// Build the built-in schema.
///
/// # Errors
///
/// Only on a programming mistake in the declarations below.
pub fn schema() -> Result<Schema> {
    Schema::builder(VERSION)
        .owned_dir(".stencil")
        .owned_dir(".stencil/guides")
        .owned_dir(".stencil/hooks")
        .shared_dir(".claude")
        .shared_dir(".claude/commands")
        .shared_dir(".vscode")
        .preserved_dir("docs/decisions")
        .owned_file(
            ".stencil/guides/GUIDE.md",
            FileDefinition::template("guide", templates::GUIDE),
        )
        .owned_file(
            ".stencil/hooks/pre-commit.sh",
            FileDefinition::generator(generators::pre_commit_hook),
        )
        .owned_file(
            ".claude/commands/check.md",
            FileDefinition::template("check-command", templates::CHECK_COMMAND),
        )
        .managed_file("AGENTS.md", FileDefinition::generator(generators::agents_md))
        .managed_file(".editorconfig", FileDefinition::fixed(templates::EDITORCONFIG))
        .managed_file(
            generators::ESLINT_CONFIG,
            FileDefinition::generator(generators::eslint_config),
        )
        .managed_file(
            generators::RUFF_CONFIG,
            FileDefinition::generator(generators::ruff_config),
        )
        .managed_file(
            "docs/decisions/TEMPLATE.md",
            FileDefinition::template("decision", templates::DECISION_TEMPLATE),
        )
        .json_merge("package.json", package_json()?)
        .json_merge(
            ".vscode/settings.json",
            JsonMergeDefinition::entries(
                vec![
                    (key(".vscode/settings.json", r"editor\.formatOnSave")?, json!(true)),
                    (
                        key(".vscode/settings.json", r"files\.insertFinalNewline")?,
                        json!(true),
                    ),
                ],
                Vec::new(),
            )
            .remove_file_if_empty(true),
        )
        .json_merge(
            ".claude/settings.json",
            JsonMergeDefinition::entries(
                vec![(
                    key(".claude/settings.json", "hooks.Stop")?,
                    json!([{
                        "hooks": [{
                            "type": "command",
                            "command": "sh .stencil/hooks/pre-commit.sh"
                        }]
                    }]),
                )],
                Vec::new(),
            )
            .remove_file_if_empty(true),
        )
        .text_patch(
            ".gitignore",
            TextPatch::append("# stencil\n.stencil/cache/\n", "# stencil").create_if_missing(true),
        )
        .text_patch(
            "CLAUDE.md",
            TextPatch::prepend("@AGENTS.md\n", "@AGENTS.md").create_if_missing(true),
        )
        .deprecated_file(".stencil/hooks/lint.sh")
        .deprecated_file(".eslintrc.stencil.json")
        .deprecated_dir(".stencil/legacy")
        .deprecated_packages(PackageGroup::new(Ecosystem::Javascript).dev("eslint-plugin-stencil-legacy"))
        .conditional_packages(
            Predicate::HasJavascript,
            PackageGroup::new(Ecosystem::Javascript)
                .dev("eslint")
                .dev("@eslint/js")
                .dev("prettier"),
        )
        .conditional_packages(
            Predicate::HasTypescript,
            PackageGroup::new(Ecosystem::Javascript).dev("typescript-eslint"),
        )
        .conditional_packages(
            Predicate::HasPython,
            PackageGroup::new(Ecosystem::Python).dev("ruff"),
        )
        .build()
}

/// Scripts in package.json; the e2e script follows the detected framework.
fn package_json() -> Result<JsonMergeDefinition> {
    let lint = key("package.json", "scripts.lint")?;
    let format = key("package.json", "scripts.format")?;
    let e2e = key("package.json", "scripts.test:e2e")?;

    let merge = {
        let (lint, format, e2e) = (lint.clone(), format.clone(), e2e.clone());
        move |existing: &Value, ctx: &ProjectContext| {
            let mut doc = existing.clone();
            let mut wanted = vec![(&lint, json!("eslint .")), (&format, json!("prettier --write ."))];
            if Predicate::HasE2eFramework.evaluate(ctx) {
                wanted.push((&e2e, json!(generators::e2e_command(ctx))));
            } else {
                remove_path(&mut doc, &e2e);
            }
            for (key, value) in wanted {
                if set_path(&mut doc, key, value).is_err() {
                    tracing::debug!(key = %key, "script blocked by a non-object value");
                }
            }
            doc
        }
    };
    let unmerge = {
        let keys = [lint.clone(), format.clone(), e2e.clone()];
        move |existing: &Value, _: &ProjectContext| {
            let mut doc = existing.clone();
            for key in &keys {
                remove_path(&mut doc, key);
            }
            doc
        }
    };

    Ok(JsonMergeDefinition::new(vec![lint, format], merge, unmerge)
        .conditional_key(Predicate::HasE2eFramework, e2e)
        .skip_if_missing(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_is_valid() {
        let schema = schema().unwrap();
        assert_eq!(schema.version().to_string(), VERSION);
        assert!(schema.owned_directories().iter().any(|d| d.as_str() == ".stencil"));
    }

    #[test]
    fn e2e_script_tracks_framework() {
        let def = package_json().unwrap();
        let ctx = ProjectContext::builder("/p")
            .javascript()
            .test_framework("cypress")
            .build();
        let merged = def.apply_merge(&json!({"name": "x"}), &ctx).unwrap();
        assert_eq!(merged["scripts"]["test:e2e"], "cypress run");
    }
}
