//! Third-party packages the schema asks for

use serde::{Deserialize, Serialize};
use stencil_context::ProjectContext;

use crate::Predicate;

/// Package ecosystem; decides which package manager handles a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Javascript,
    Python,
    Go,
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Javascript => write!(f, "javascript"),
            Self::Python => write!(f, "python"),
            Self::Go => write!(f, "go"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    /// Install as a development dependency
    #[serde(default)]
    pub dev: bool,
}

/// Packages of one ecosystem installed in a single package-manager call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub ecosystem: Ecosystem,
    pub packages: Vec<PackageSpec>,
}

impl PackageGroup {
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            packages: Vec::new(),
        }
    }

    pub fn dev(mut self, name: impl Into<String>) -> Self {
        self.packages.push(PackageSpec {
            name: name.into(),
            dev: true,
        });
        self
    }

    pub fn runtime(mut self, name: impl Into<String>) -> Self {
        self.packages.push(PackageSpec {
            name: name.into(),
            dev: false,
        });
        self
    }

    /// Stable identity used to avoid attempting the same group twice.
    pub fn key(&self) -> String {
        let names: Vec<&str> = self.packages.iter().map(|p| p.name.as_str()).collect();
        format!("{}:{}", self.ecosystem, names.join(","))
    }
}

/// Base groups plus groups gated by a predicate.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    pub base: Vec<PackageGroup>,
    pub conditional: Vec<(Predicate, PackageGroup)>,
}

impl PackageSet {
    /// Groups required for `ctx`: all base groups, then conditionals in order.
    pub fn required(&self, ctx: &ProjectContext) -> Vec<&PackageGroup> {
        self.base
            .iter()
            .chain(
                self.conditional
                    .iter()
                    .filter(|(predicate, _)| predicate.evaluate(ctx))
                    .map(|(_, group)| group),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.conditional.is_empty()
    }
}
