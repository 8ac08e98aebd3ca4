//! Package groups

use std::collections::BTreeMap;

use stencil_schema::Ecosystem;

use super::Pass;
use crate::cache::ReconcileCache;
use crate::ledger::InstalledPackage;
use crate::packages::PackageManager;
use crate::report::PackageFailure;

/// The manager to use, unless packages are skipped for this pass.
fn manager<'a>(pass: &Pass<'a>) -> Option<&'a dyn PackageManager> {
    if pass.options.skip_packages {
        tracing::debug!("packages skipped");
        return None;
    }
    pass.packages
}

/// Install every required group not yet attempted in this invocation.
///
/// Packages the project already depends on are left to the project; only
/// packages stencil itself installs are recorded for uninstall.
pub(super) fn install_required(pass: &mut Pass<'_>, cache: &mut ReconcileCache) {
    let Some(manager) = manager(pass) else {
        return;
    };
    let groups: Vec<_> = pass
        .schema
        .packages()
        .required(pass.ctx)
        .into_iter()
        .cloned()
        .collect();

    for group in groups {
        if !cache.begin_package_group(&group.key()) {
            tracing::debug!(group = %group.key(), "package group already attempted");
            continue;
        }

        let mut wanted: BTreeMap<bool, Vec<String>> = BTreeMap::new();
        for spec in &group.packages {
            if pass.ctx.has_dependency(&spec.name) || pass.ledger.has_package(group.ecosystem, &spec.name) {
                pass.report.packages.already_present.push(spec.name.clone());
            } else {
                wanted.entry(spec.dev).or_default().push(spec.name.clone());
            }
        }

        for (dev, names) in wanted {
            if !pass.dry_run()
                && let Err(e) = manager.install(group.ecosystem, &names, dev)
            {
                tracing::warn!(ecosystem = %group.ecosystem, error = %e, "package install failed");
                pass.report.packages.errors.push(PackageFailure {
                    packages: names,
                    message: e.to_string(),
                });
                continue;
            }
            for name in &names {
                if !pass.dry_run() {
                    pass.ledger.record_package(InstalledPackage {
                        ecosystem: group.ecosystem,
                        name: name.clone(),
                        dev,
                    });
                }
                pass.report.packages.installed.push(name.clone());
            }
        }
    }
}

/// Uninstall deprecated packages that stencil installed or the project
/// still depends on.
pub(super) fn uninstall_deprecated(pass: &mut Pass<'_>) {
    let Some(manager) = manager(pass) else {
        return;
    };
    let mut batches: BTreeMap<(Ecosystem, bool), Vec<String>> = BTreeMap::new();
    for group in pass.schema.deprecated_packages() {
        for spec in &group.packages {
            if pass.ledger.has_package(group.ecosystem, &spec.name) || pass.ctx.has_dependency(&spec.name) {
                batches
                    .entry((group.ecosystem, spec.dev))
                    .or_default()
                    .push(spec.name.clone());
            }
        }
    }
    uninstall_batches(pass, manager, batches);
}

/// Uninstall everything the ledger says stencil installed.
pub(super) fn uninstall_recorded(pass: &mut Pass<'_>) {
    let Some(manager) = manager(pass) else {
        return;
    };
    let mut batches: BTreeMap<(Ecosystem, bool), Vec<String>> = BTreeMap::new();
    for package in pass.ledger.packages() {
        batches
            .entry((package.ecosystem, package.dev))
            .or_default()
            .push(package.name.clone());
    }
    uninstall_batches(pass, manager, batches);
}

fn uninstall_batches(
    pass: &mut Pass<'_>,
    manager: &dyn PackageManager,
    batches: BTreeMap<(Ecosystem, bool), Vec<String>>,
) {
    for ((ecosystem, dev), names) in batches {
        if !pass.dry_run()
            && let Err(e) = manager.uninstall(ecosystem, &names, dev)
        {
            tracing::warn!(%ecosystem, error = %e, "package uninstall failed");
            pass.report.packages.errors.push(PackageFailure {
                packages: names,
                message: e.to_string(),
            });
            continue;
        }
        for name in &names {
            if !pass.dry_run() {
                pass.ledger.forget_package(ecosystem, name);
            }
            pass.report.packages.uninstalled.push(name.clone());
        }
    }
}
