//! Named conditions evaluated against a [`ProjectContext`]

use std::str::FromStr;

use stencil_context::ProjectContext;

use crate::Error;

/// A condition gating conditional JSON keys and package groups.
///
/// Each predicate has a stable textual name (`has-python`,
/// `has-dependency:react`, `not:has-linter`) so schemas can be logged and
/// compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    HasJavascript,
    HasTypescript,
    HasPython,
    HasGo,
    HasRust,
    HasLinter,
    HasFormatter,
    HasTestFramework,
    HasE2eFramework,
    IsVersionControlled,
    HasDependency(String),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn evaluate(&self, ctx: &ProjectContext) -> bool {
        match self {
            Self::HasJavascript => ctx.languages().javascript,
            Self::HasTypescript => ctx.languages().typescript,
            Self::HasPython => ctx.languages().python,
            Self::HasGo => ctx.languages().go,
            Self::HasRust => ctx.languages().rust,
            Self::HasLinter => !ctx.tooling().linters.is_empty(),
            Self::HasFormatter => !ctx.tooling().formatters.is_empty(),
            Self::HasTestFramework => !ctx.tooling().test_frameworks.is_empty(),
            Self::HasE2eFramework => ctx.tooling().has_e2e_framework(),
            Self::IsVersionControlled => ctx.is_version_controlled(),
            Self::HasDependency(name) => ctx.has_dependency(name),
            Self::Not(inner) => !inner.evaluate(ctx),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::HasJavascript => "has-javascript".to_string(),
            Self::HasTypescript => "has-typescript".to_string(),
            Self::HasPython => "has-python".to_string(),
            Self::HasGo => "has-go".to_string(),
            Self::HasRust => "has-rust".to_string(),
            Self::HasLinter => "has-linter".to_string(),
            Self::HasFormatter => "has-formatter".to_string(),
            Self::HasTestFramework => "has-test-framework".to_string(),
            Self::HasE2eFramework => "has-e2e-framework".to_string(),
            Self::IsVersionControlled => "is-version-controlled".to_string(),
            Self::HasDependency(name) => format!("has-dependency:{name}"),
            Self::Not(inner) => format!("not:{}", inner.name()),
        }
    }
}

impl FromStr for Predicate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix("not:") {
            return Ok(Self::not(inner.parse()?));
        }
        if let Some(name) = s.strip_prefix("has-dependency:")
            && !name.is_empty()
        {
            return Ok(Self::HasDependency(name.to_string()));
        }
        Ok(match s {
            "has-javascript" => Self::HasJavascript,
            "has-typescript" => Self::HasTypescript,
            "has-python" => Self::HasPython,
            "has-go" => Self::HasGo,
            "has-rust" => Self::HasRust,
            "has-linter" => Self::HasLinter,
            "has-formatter" => Self::HasFormatter,
            "has-test-framework" => Self::HasTestFramework,
            "has-e2e-framework" => Self::HasE2eFramework,
            "is-version-controlled" => Self::IsVersionControlled,
            _ => {
                return Err(Error::UnknownPredicate {
                    name: s.to_string(),
                });
            }
        })
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
