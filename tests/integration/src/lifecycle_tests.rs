//! Whole-lifecycle scenarios: detection, the built-in schema and the engine
//! working together on realistic project layouts.

use std::sync::Mutex;

use pretty_assertions::assert_eq;
use stencil_context::{JsPackageManager, ProjectContext};
use stencil_core::{
    Operation, PackageError, PackageManager, ReconcileCache, ReconcileEngine, ReconcileReport,
};
use stencil_schema::{Ecosystem, FileDefinition, Schema, builtin};
use stencil_test_utils::{TestProject, TreeSnapshot};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Package manager that only remembers what it was asked to do
#[derive(Default)]
struct Recorder {
    installs: Mutex<Vec<(Ecosystem, Vec<String>)>>,
    uninstalls: Mutex<Vec<(Ecosystem, Vec<String>)>>,
}

impl PackageManager for Recorder {
    fn install(&self, ecosystem: Ecosystem, names: &[String], _dev: bool) -> Result<(), PackageError> {
        self.installs.lock().unwrap().push((ecosystem, names.to_vec()));
        Ok(())
    }

    fn uninstall(&self, ecosystem: Ecosystem, names: &[String], _dev: bool) -> Result<(), PackageError> {
        self.uninstalls.lock().unwrap().push((ecosystem, names.to_vec()));
        Ok(())
    }
}

/// Detect the project afresh, as every CLI invocation does, and run one pass.
fn run(project: &TestProject, schema: &Schema, operation: Operation) -> ReconcileReport {
    run_with(project, schema, operation, &Recorder::default())
}

fn run_with(
    project: &TestProject,
    schema: &Schema,
    operation: Operation,
    packages: &Recorder,
) -> ReconcileReport {
    let ctx = ProjectContext::detect(project.root()).unwrap();
    let report = ReconcileEngine::new(schema, &ctx)
        .with_package_manager(packages)
        .reconcile(operation, &mut ReconcileCache::new())
        .unwrap();
    assert!(report.is_success(), "{operation} errors: {:?}", report.errors);
    report
}

fn pnpm_typescript_project() -> TestProject {
    TestProject::new()
        .with_file(
            "package.json",
            "{\n  \"name\": \"web\",\n  \"private\": true,\n  \"devDependencies\": {\n    \"typescript\": \"^5.4.0\"\n  }\n}\n",
        )
        .with_file("pnpm-lock.yaml", "lockfileVersion: '9.0'\n")
        .with_file("tsconfig.json", "{}\n")
        .with_file(".gitignore", "node_modules/\ndist/\n")
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn typescript_project_gets_tailored_configuration() {
    let project = pnpm_typescript_project();
    let ctx = ProjectContext::detect(project.root()).unwrap();
    assert_eq!(ctx.js_package_manager(), Some(JsPackageManager::Pnpm));

    run(&project, &builtin::schema().unwrap(), Operation::Install);

    project.assert_file_contains("eslint.config.mjs", "typescript-eslint");
    project.assert_file_contains(".stencil/hooks/pre-commit.sh", "pnpm lint");
    project.assert_file_contains("AGENTS.md", "npx tsc --noEmit");
    project.assert_file_eq(
        ".gitignore",
        "node_modules/\ndist/\n# stencil\n.stencil/cache/\n",
    );
    let manifest = project.read_json("package.json");
    assert_eq!(manifest["scripts"]["lint"], "eslint .");
    assert_eq!(manifest["devDependencies"]["typescript"], "^5.4.0");
    assert!(manifest["scripts"].get("test:e2e").is_none());
}

#[test]
fn repeated_detection_and_install_is_stable() {
    let project = pnpm_typescript_project();
    let schema = builtin::schema().unwrap();

    run(&project, &schema, Operation::Install);
    let first = TreeSnapshot::capture(project.root());

    let report = run(&project, &schema, Operation::Install);
    assert!(!report.has_changes(), "{report:?}");
    assert!(report.preserved.is_empty());
    TreeSnapshot::capture(project.root()).assert_same(&first);

    let report = run(&project, &schema, Operation::Upgrade);
    assert!(!report.has_changes(), "{report:?}");
    TreeSnapshot::capture(project.root()).assert_same(&first);
}

#[test]
fn full_lifecycle_restores_the_original_tree() {
    let project = pnpm_typescript_project();
    let before = TreeSnapshot::capture(project.root());
    let schema = builtin::schema().unwrap();

    run(&project, &schema, Operation::Install);
    run(&project, &schema, Operation::Upgrade);
    run(&project, &schema, Operation::Uninstall);

    TreeSnapshot::capture(project.root()).assert_same(&before);
}

#[test]
fn user_eslint_setup_is_respected() {
    let project = TestProject::javascript().with_file(".eslintrc.json", "{\"root\": true}\n");
    let before = TreeSnapshot::capture(project.root());
    let schema = builtin::schema().unwrap();

    run(&project, &schema, Operation::Install);
    project.assert_not_exists("eslint.config.mjs");
    project.assert_file_eq(".eslintrc.json", "{\"root\": true}\n");

    run(&project, &schema, Operation::Uninstall);
    TreeSnapshot::capture(project.root()).assert_same(&before);
}

#[test]
fn python_project_with_its_own_ruff_config() {
    let project = TestProject::python().with_file(".ruff.toml", "line-length = 88\n");
    let schema = builtin::schema().unwrap();
    let packages = Recorder::default();

    run_with(&project, &schema, Operation::Install, &packages);

    project.assert_not_exists("ruff.toml");
    project.assert_not_exists("package.json");
    project.assert_file_contains(".stencil/hooks/pre-commit.sh", "ruff check .");
    assert_eq!(
        *packages.installs.lock().unwrap(),
        vec![(Ecosystem::Python, vec!["ruff".to_string()])]
    );
}

#[test]
fn workspace_dependencies_count_as_already_present() {
    let project = TestProject::new()
        .with_file(
            "package.json",
            "{\"name\": \"mono\", \"private\": true, \"workspaces\": [\"packages/*\"]}\n",
        )
        .with_file(
            "packages/ui/package.json",
            "{\"name\": \"ui\", \"devDependencies\": {\"eslint\": \"^9.0.0\", \"prettier\": \"^3.0.0\"}}\n",
        );
    let packages = Recorder::default();

    let report = run_with(&project, &builtin::schema().unwrap(), Operation::Install, &packages);

    assert_eq!(report.packages.already_present, ["eslint", "prettier"]);
    assert_eq!(
        *packages.installs.lock().unwrap(),
        vec![(Ecosystem::Javascript, vec!["@eslint/js".to_string()])]
    );
}

#[test]
fn reset_uninstalls_what_setup_installed() {
    let project = TestProject::javascript();
    let schema = builtin::schema().unwrap();
    let packages = Recorder::default();

    run_with(&project, &schema, Operation::Install, &packages);
    let report = run_with(&project, &schema, Operation::Uninstall, &packages);

    let mut removed = report.packages.uninstalled.clone();
    removed.sort();
    assert_eq!(removed, ["@eslint/js", "eslint", "prettier"]);
}

/// An earlier release, as far as its files are concerned.
fn previous_release() -> Schema {
    Schema::builder("0.9.0")
        .owned_dir(".stencil")
        .owned_dir(".stencil/hooks")
        .owned_dir(".stencil/legacy")
        .owned_file(".stencil/hooks/lint.sh", FileDefinition::fixed("#!/bin/sh\neslint .\n"))
        .owned_file(".stencil/legacy/NOTES.md", FileDefinition::fixed("# Notes\n"))
        .managed_file(".eslintrc.stencil.json", FileDefinition::fixed("{}\n"))
        .managed_file("AGENTS.md", FileDefinition::fixed("# Agents\n"))
        .build()
        .unwrap()
}

#[test]
fn upgrade_from_previous_release_migrates_cleanly() {
    let project = TestProject::javascript();
    let before = TreeSnapshot::capture(project.root());
    let current = builtin::schema().unwrap();

    run(&project, &previous_release(), Operation::Install);
    project.assert_file_eq(".stencil/version", "0.9.0\n");

    let report = run(&project, &current, Operation::Upgrade);

    project.assert_not_exists(".stencil/hooks/lint.sh");
    project.assert_not_exists(".stencil/legacy");
    project.assert_not_exists(".eslintrc.stencil.json");
    project.assert_file_contains("AGENTS.md", "Read `.stencil/guides/GUIDE.md`");
    assert!(report.updated.contains(&"AGENTS.md".to_string()));
    project.assert_file_eq(".stencil/version", "1.0.0\n");

    run(&project, &current, Operation::Uninstall);
    TreeSnapshot::capture(project.root()).assert_same(&before);
}

#[test]
fn upgrade_from_previous_release_keeps_customized_agents_file() {
    let project = TestProject::javascript();
    let current = builtin::schema().unwrap();

    run(&project, &previous_release(), Operation::Install);
    project.write("AGENTS.md", "# Agents\n\nOur own rules.\n");

    let report = run(&project, &current, Operation::Upgrade);

    project.assert_file_eq("AGENTS.md", "# Agents\n\nOur own rules.\n");
    assert_eq!(report.preserved, ["AGENTS.md"]);

    run(&project, &current, Operation::Uninstall);
    project.assert_file_eq("AGENTS.md", "# Agents\n\nOur own rules.\n");
    project.assert_not_exists(".stencil");
}
