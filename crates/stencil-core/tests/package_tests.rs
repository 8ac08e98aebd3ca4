//! Package installation through a recording package manager.

use std::sync::Mutex;

use pretty_assertions::assert_eq;
use stencil_context::ProjectContext;
use stencil_core::{
    Ledger, Operation, PackageError, PackageManager, ReconcileCache, ReconcileEngine,
    ReconcileOptions, ReconcileReport,
};
use stencil_schema::{Ecosystem, PackageGroup, Predicate, Schema};
use stencil_test_utils::TestProject;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Install(Ecosystem, Vec<String>, bool),
    Uninstall(Ecosystem, Vec<String>, bool),
}

/// Records every call; fails installs of any package named in `broken`.
#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<Call>>,
    broken: Vec<String>,
}

impl Recording {
    fn failing(name: &str) -> Self {
        Self {
            broken: vec![name.to_string()],
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl PackageManager for Recording {
    fn install(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Install(ecosystem, names.to_vec(), dev));
        if names.iter().any(|n| self.broken.contains(n)) {
            return Err(PackageError::CommandFailed {
                command: format!("npm install {}", names.join(" ")),
                message: "ERESOLVE".into(),
            });
        }
        Ok(())
    }

    fn uninstall(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Uninstall(ecosystem, names.to_vec(), dev));
        Ok(())
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn lint_schema(version: &str) -> Schema {
    Schema::builder(version)
        .conditional_packages(
            Predicate::HasJavascript,
            PackageGroup::new(Ecosystem::Javascript)
                .dev("eslint")
                .dev("prettier"),
        )
        .conditional_packages(
            Predicate::HasPython,
            PackageGroup::new(Ecosystem::Python).dev("ruff"),
        )
        .build()
        .unwrap()
}

fn reconcile(
    schema: &Schema,
    ctx: &ProjectContext,
    manager: &Recording,
    operation: Operation,
    cache: &mut ReconcileCache,
) -> ReconcileReport {
    ReconcileEngine::new(schema, ctx)
        .with_package_manager(manager)
        .reconcile(operation, cache)
        .unwrap()
}

#[test]
fn installs_only_groups_whose_predicate_holds() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root()).javascript().build();
    let manager = Recording::default();

    let report = reconcile(
        &lint_schema("1.0.0"),
        &ctx,
        &manager,
        Operation::Install,
        &mut ReconcileCache::new(),
    );

    assert_eq!(
        manager.calls(),
        vec![Call::Install(Ecosystem::Javascript, names(&["eslint", "prettier"]), true)]
    );
    assert_eq!(report.packages.installed, names(&["eslint", "prettier"]));

    let ledger = Ledger::load(ctx.root()).unwrap();
    assert!(ledger.has_package(Ecosystem::Javascript, "eslint"));
    assert!(!ledger.has_package(Ecosystem::Python, "ruff"));
}

#[test]
fn existing_dependencies_are_left_to_the_project() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root())
        .javascript()
        .dependency("eslint", "^9.0.0")
        .build();
    let manager = Recording::default();

    let report = reconcile(
        &lint_schema("1.0.0"),
        &ctx,
        &manager,
        Operation::Install,
        &mut ReconcileCache::new(),
    );

    assert_eq!(
        manager.calls(),
        vec![Call::Install(Ecosystem::Javascript, names(&["prettier"]), true)]
    );
    assert_eq!(report.packages.already_present, names(&["eslint"]));
    let ledger = Ledger::load(ctx.root()).unwrap();
    assert!(!ledger.has_package(Ecosystem::Javascript, "eslint"));
}

#[test]
fn shared_cache_attempts_each_group_once() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root()).javascript().build();
    let manager = Recording::failing("eslint");
    let schema = lint_schema("1.0.0");
    let mut cache = ReconcileCache::new();

    reconcile(&schema, &ctx, &manager, Operation::Install, &mut cache);
    reconcile(&schema, &ctx, &manager, Operation::Upgrade, &mut cache);

    assert_eq!(manager.calls().len(), 1);
}

#[test]
fn package_failure_does_not_fail_the_pass() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root()).javascript().build();
    let manager = Recording::failing("prettier");

    let report = reconcile(
        &lint_schema("1.0.0"),
        &ctx,
        &manager,
        Operation::Install,
        &mut ReconcileCache::new(),
    );

    assert!(report.is_success());
    assert_eq!(report.packages.errors.len(), 1);
    assert_eq!(report.packages.errors[0].packages, names(&["eslint", "prettier"]));
    assert!(report.packages.errors[0].message.contains("ERESOLVE"));
    assert!(report.packages.installed.is_empty());
    project.assert_file_eq(".stencil/version", "1.0.0\n");
}

#[test]
fn uninstall_removes_only_recorded_packages() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root())
        .javascript()
        .dependency("eslint", "^9.0.0")
        .build();
    let manager = Recording::default();
    let schema = lint_schema("1.0.0");

    reconcile(&schema, &ctx, &manager, Operation::Install, &mut ReconcileCache::new());
    let report = reconcile(&schema, &ctx, &manager, Operation::Uninstall, &mut ReconcileCache::new());

    assert_eq!(
        manager.calls().last(),
        Some(&Call::Uninstall(Ecosystem::Javascript, names(&["prettier"]), true))
    );
    assert_eq!(report.packages.uninstalled, names(&["prettier"]));
    project.assert_not_exists(".stencil");
}

#[test]
fn upgrade_uninstalls_deprecated_packages() {
    let project = TestProject::javascript();
    let manager = Recording::default();
    let v1 = Schema::builder("1.0.0")
        .packages(PackageGroup::new(Ecosystem::Javascript).dev("eslint-plugin-old"))
        .build()
        .unwrap();
    let v2 = Schema::builder("2.0.0")
        .deprecated_packages(PackageGroup::new(Ecosystem::Javascript).dev("eslint-plugin-old"))
        .build()
        .unwrap();
    let ctx = ProjectContext::builder(project.root()).javascript().build();

    reconcile(&v1, &ctx, &manager, Operation::Install, &mut ReconcileCache::new());
    let report = reconcile(&v2, &ctx, &manager, Operation::Upgrade, &mut ReconcileCache::new());

    assert_eq!(report.packages.uninstalled, names(&["eslint-plugin-old"]));
    let ledger = Ledger::load(ctx.root()).unwrap();
    assert!(ledger.packages().is_empty());
}

#[test]
fn skipped_packages_are_neither_installed_nor_recorded() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root()).javascript().build();
    let manager = Recording::default();
    let options = ReconcileOptions {
        skip_packages: true,
        ..ReconcileOptions::default()
    };

    let report = ReconcileEngine::new(&lint_schema("1.0.0"), &ctx)
        .with_package_manager(&manager)
        .with_options(options)
        .reconcile(Operation::Install, &mut ReconcileCache::new())
        .unwrap();

    assert!(manager.calls().is_empty());
    assert!(report.packages.is_empty());
}

#[test]
fn dry_run_plans_packages_without_calling_the_manager() {
    let project = TestProject::javascript();
    let ctx = ProjectContext::builder(project.root()).javascript().build();
    let manager = Recording::default();
    let options = ReconcileOptions {
        dry_run: true,
        ..ReconcileOptions::default()
    };

    let report = ReconcileEngine::new(&lint_schema("1.0.0"), &ctx)
        .with_package_manager(&manager)
        .with_options(options)
        .reconcile(Operation::Install, &mut ReconcileCache::new())
        .unwrap();

    assert!(manager.calls().is_empty());
    assert_eq!(report.packages.installed, names(&["eslint", "prettier"]));
    project.assert_not_exists(".stencil");
}
