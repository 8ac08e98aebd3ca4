//! Linter, formatter and test framework detection

use std::collections::BTreeSet;

use stencil_fs::NormalizedPath;

use crate::context::ExistingTooling;

struct ConfigFile {
    file: &'static str,
    linter: Option<&'static str>,
    formatter: Option<&'static str>,
    test_framework: Option<&'static str>,
}

const fn lint(file: &'static str, name: &'static str) -> ConfigFile {
    ConfigFile { file, linter: Some(name), formatter: None, test_framework: None }
}

const fn format(file: &'static str, name: &'static str) -> ConfigFile {
    ConfigFile { file, linter: None, formatter: Some(name), test_framework: None }
}

const fn both(file: &'static str, name: &'static str) -> ConfigFile {
    ConfigFile { file, linter: Some(name), formatter: Some(name), test_framework: None }
}

const fn test(file: &'static str, name: &'static str) -> ConfigFile {
    ConfigFile { file, linter: None, formatter: None, test_framework: Some(name) }
}

const fn plain(file: &'static str) -> ConfigFile {
    ConfigFile { file, linter: None, formatter: None, test_framework: None }
}

const CONFIG_FILES: &[ConfigFile] = &[
    lint(".eslintrc", "eslint"),
    lint(".eslintrc.js", "eslint"),
    lint(".eslintrc.cjs", "eslint"),
    lint(".eslintrc.json", "eslint"),
    lint(".eslintrc.yml", "eslint"),
    lint(".eslintrc.yaml", "eslint"),
    lint("eslint.config.js", "eslint"),
    lint("eslint.config.mjs", "eslint"),
    lint("eslint.config.cjs", "eslint"),
    lint("eslint.config.ts", "eslint"),
    both("biome.json", "biome"),
    both("biome.jsonc", "biome"),
    both("ruff.toml", "ruff"),
    both(".ruff.toml", "ruff"),
    lint(".flake8", "flake8"),
    lint(".pylintrc", "pylint"),
    lint(".golangci.yml", "golangci-lint"),
    lint(".golangci.yaml", "golangci-lint"),
    lint("clippy.toml", "clippy"),
    format(".prettierrc", "prettier"),
    format(".prettierrc.json", "prettier"),
    format(".prettierrc.js", "prettier"),
    format(".prettierrc.cjs", "prettier"),
    format(".prettierrc.mjs", "prettier"),
    format(".prettierrc.yml", "prettier"),
    format(".prettierrc.yaml", "prettier"),
    format("prettier.config.js", "prettier"),
    format("prettier.config.mjs", "prettier"),
    format("rustfmt.toml", "rustfmt"),
    format(".rustfmt.toml", "rustfmt"),
    test("playwright.config.ts", "playwright"),
    test("playwright.config.js", "playwright"),
    test("cypress.config.ts", "cypress"),
    test("cypress.config.js", "cypress"),
    test("jest.config.js", "jest"),
    test("jest.config.ts", "jest"),
    test("vitest.config.ts", "vitest"),
    test("vitest.config.js", "vitest"),
    test("pytest.ini", "pytest"),
    plain(".editorconfig"),
    plain("tsconfig.json"),
];

/// `[tool.*]` sections of pyproject.toml that configure a linter or formatter.
const PYPROJECT_TOOLS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("ruff", Some("ruff"), Some("ruff")),
    ("black", None, Some("black")),
    ("pylint", Some("pylint"), None),
    ("flake8", Some("flake8"), None),
    ("mypy", Some("mypy"), None),
];

/// Dependency name to test framework.
const TEST_DEPENDENCIES: &[(&str, &str)] = &[
    ("@playwright/test", "playwright"),
    ("playwright", "playwright"),
    ("pytest-playwright", "playwright"),
    ("cypress", "cypress"),
    ("jest", "jest"),
    ("vitest", "vitest"),
    ("mocha", "mocha"),
    ("pytest", "pytest"),
];

pub(crate) fn detect<'a>(
    root: &NormalizedPath,
    pyproject_tools: &BTreeSet<String>,
    dependency_names: impl Iterator<Item = &'a str>,
) -> ExistingTooling {
    let mut tooling = ExistingTooling::default();

    for entry in CONFIG_FILES {
        if !root.join(entry.file).is_file() {
            continue;
        }
        tooling.config_files.insert(entry.file.to_string());
        if let Some(linter) = entry.linter {
            tooling.linters.insert(linter.to_string());
        }
        if let Some(formatter) = entry.formatter {
            tooling.formatters.insert(formatter.to_string());
        }
        if let Some(framework) = entry.test_framework {
            tooling.test_frameworks.insert(framework.to_string());
        }
    }

    for (section, linter, formatter) in PYPROJECT_TOOLS {
        if !pyproject_tools.contains(*section) {
            continue;
        }
        if let Some(linter) = linter {
            tooling.linters.insert(linter.to_string());
        }
        if let Some(formatter) = formatter {
            tooling.formatters.insert(formatter.to_string());
        }
    }
    if pyproject_tools.contains("pytest") {
        tooling.test_frameworks.insert("pytest".to_string());
    }

    for name in dependency_names {
        if let Some((_, framework)) = TEST_DEPENDENCIES.iter().find(|(dep, _)| *dep == name) {
            tooling.test_frameworks.insert(framework.to_string());
        }
    }

    tracing::debug!(
        linters = ?tooling.linters,
        formatters = ?tooling.formatters,
        test_frameworks = ?tooling.test_frameworks,
        "detected tooling"
    );
    tooling
}
