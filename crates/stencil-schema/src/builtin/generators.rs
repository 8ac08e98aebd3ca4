//! Content generators for the built-in schema

use stencil_context::{JsPackageManager, ProjectContext};

use crate::{FileOutcome, GeneratorError};

/// Our own linter configs; their presence must not count as "user tooling".
pub(crate) const ESLINT_CONFIG: &str = "eslint.config.mjs";
pub(crate) const RUFF_CONFIG: &str = "ruff.toml";

fn js_runner(ctx: &ProjectContext) -> &'static str {
    match ctx.js_package_manager() {
        Some(JsPackageManager::Pnpm) => "pnpm",
        Some(JsPackageManager::Yarn) => "yarn",
        Some(JsPackageManager::Bun) => "bun run",
        Some(JsPackageManager::Npm) | None => "npm run",
    }
}

fn commands(ctx: &ProjectContext) -> Vec<(&'static str, String)> {
    let langs = ctx.languages();
    let mut out = Vec::new();
    if langs.javascript {
        let run = js_runner(ctx);
        out.push(("Lint JavaScript", format!("{run} lint")));
        out.push(("Format JavaScript", format!("{run} format")));
        if langs.typescript {
            out.push(("Type-check", "npx tsc --noEmit".to_string()));
        }
    }
    if langs.python {
        out.push(("Lint Python", "ruff check .".to_string()));
        out.push(("Format Python", "ruff format --check .".to_string()));
    }
    if langs.go {
        out.push(("Vet Go", "go vet ./...".to_string()));
    }
    if langs.rust {
        out.push(("Lint Rust", "cargo clippy --all-targets".to_string()));
    }
    out
}

pub(crate) fn agents_md(ctx: &ProjectContext) -> Result<FileOutcome, GeneratorError> {
    let mut out = String::from("# Agent Instructions\n\n");
    out.push_str("Read `.stencil/guides/GUIDE.md` before making changes.\n");

    let commands = commands(ctx);
    if !commands.is_empty() {
        out.push_str("\n## Checks\n\n");
        for (label, command) in &commands {
            out.push_str(&format!("- {label}: `{command}`\n"));
        }
    }

    if ctx.tooling().has_e2e_framework() {
        out.push_str("\n## End-to-end tests\n\n");
        out.push_str("Run the end-to-end suite before touching user-facing flows.\n");
    }
    Ok(FileOutcome::Content(out))
}

pub(crate) fn pre_commit_hook(ctx: &ProjectContext) -> Result<FileOutcome, GeneratorError> {
    let mut out = String::from("#!/bin/sh\n# Generated by stencil. Local edits are overwritten on upgrade.\nset -e\n");
    for (label, command) in commands(ctx) {
        out.push_str(&format!("\necho \"==> {label}\"\n{command}\n"));
    }
    Ok(FileOutcome::Content(out))
}

pub(crate) fn eslint_config(ctx: &ProjectContext) -> Result<FileOutcome, GeneratorError> {
    if !ctx.languages().javascript {
        return Ok(FileOutcome::Skip);
    }
    let tooling = ctx.tooling();
    let foreign_eslint = tooling
        .config_files
        .iter()
        .any(|f| f != ESLINT_CONFIG && (f.starts_with(".eslintrc") || f.starts_with("eslint.config")));
    if foreign_eslint || tooling.has_linter("biome") {
        return Ok(FileOutcome::Skip);
    }

    let mut out = String::from("import js from \"@eslint/js\";\n");
    if ctx.languages().typescript {
        out.push_str("import tseslint from \"typescript-eslint\";\n");
    }
    out.push_str("\nexport default [\n  js.configs.recommended,\n");
    if ctx.languages().typescript {
        out.push_str("  ...tseslint.configs.recommended,\n");
    }
    out.push_str("  { ignores: [\"dist/\", \"build/\", \".stencil/\"] },\n];\n");
    Ok(FileOutcome::Content(out))
}

pub(crate) fn ruff_config(ctx: &ProjectContext) -> Result<FileOutcome, GeneratorError> {
    if !ctx.languages().python {
        return Ok(FileOutcome::Skip);
    }
    let tooling = ctx.tooling();
    let ruff_elsewhere = tooling.has_linter("ruff") && !tooling.has_config(RUFF_CONFIG);
    if ruff_elsewhere || tooling.has_config(".ruff.toml") {
        return Ok(FileOutcome::Skip);
    }
    Ok(FileOutcome::Content(
        "line-length = 100\n\n[lint]\nselect = [\"E\", \"F\", \"I\", \"B\", \"UP\"]\n".to_string(),
    ))
}

pub(crate) fn e2e_command(ctx: &ProjectContext) -> &'static str {
    if ctx.tooling().test_frameworks.contains("cypress")
        && !ctx.tooling().test_frameworks.contains("playwright")
    {
        "cypress run"
    } else {
        "playwright test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_context::ExistingTooling;

    fn content(outcome: FileOutcome) -> String {
        match outcome {
            FileOutcome::Content(c) => c,
            FileOutcome::Skip => panic!("expected content"),
        }
    }

    #[test]
    fn eslint_skipped_outside_javascript() {
        let ctx = ProjectContext::builder("/p").python().build();
        assert_eq!(eslint_config(&ctx).unwrap(), FileOutcome::Skip);
    }

    #[test]
    fn eslint_respects_user_config_but_not_its_own() {
        let mut tooling = ExistingTooling::default();
        tooling.linters.insert("eslint".into());
        tooling.config_files.insert(ESLINT_CONFIG.into());
        let ours = ProjectContext::builder("/p").javascript().tooling(tooling.clone()).build();
        assert!(matches!(eslint_config(&ours).unwrap(), FileOutcome::Content(_)));

        tooling.config_files.insert(".eslintrc.json".into());
        let theirs = ProjectContext::builder("/p").javascript().tooling(tooling).build();
        assert_eq!(eslint_config(&theirs).unwrap(), FileOutcome::Skip);
    }

    #[test]
    fn typescript_extends_eslint_config() {
        let ctx = ProjectContext::builder("/p").javascript().typescript().build();
        assert!(content(eslint_config(&ctx).unwrap()).contains("typescript-eslint"));
    }

    #[test]
    fn ruff_skipped_when_configured_in_pyproject() {
        let ctx = ProjectContext::builder("/p").python().linter("ruff").build();
        assert_eq!(ruff_config(&ctx).unwrap(), FileOutcome::Skip);
    }

    #[test]
    fn hook_uses_detected_package_manager() {
        let ctx = ProjectContext::builder("/p")
            .javascript()
            .js_package_manager(Some(JsPackageManager::Pnpm))
            .build();
        assert!(content(pre_commit_hook(&ctx).unwrap()).contains("pnpm lint"));
    }

    #[test]
    fn agents_md_is_deterministic() {
        let ctx = ProjectContext::builder("/p").python().go().build();
        assert_eq!(agents_md(&ctx).unwrap(), agents_md(&ctx).unwrap());
    }
}
