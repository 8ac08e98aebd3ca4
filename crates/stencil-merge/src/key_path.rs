//! Dot-notation paths into JSON documents.
//!
//! `scripts.lint` addresses `{"scripts": {"lint": ..}}`. Keys that contain a
//! literal dot, common in editor settings, are written with a backslash:
//! `editor\.formatOnSave` addresses the single top-level key
//! `"editor.formatOnSave"`.

use std::str::FromStr;

use crate::{Error, Result};

/// A parsed dot-notation key path. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dot-notation path, honouring `\.` and `\\` escapes.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidKeyPath {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('.' | '\\')) => current.push(escaped),
                    Some(_) | None => return Err(invalid("dangling escape")),
                },
                '.' => {
                    if current.is_empty() {
                        return Err(invalid("empty segment"));
                    }
                    segments.push(std::mem::take(&mut current));
                }
                other => current.push(other),
            }
        }
        if current.is_empty() {
            return Err(invalid("empty segment"));
        }
        segments.push(current);

        Ok(Self { segments })
    }

    /// Build a path from raw segments; no escaping is applied.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(Error::InvalidKeyPath {
                input: segments.join("."),
                reason: "empty segment".to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `self` equals `other` or is one of its ancestors.
    pub fn is_prefix_of(&self, other: &KeyPath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Every proper ancestor, shortest first.
    pub fn parents(&self) -> Vec<KeyPath> {
        (1..self.segments.len())
            .map(|len| KeyPath {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }

    /// The first `len` segments as a display string, for error messages.
    pub(crate) fn prefix_display(&self, len: usize) -> String {
        render(&self.segments[..len.min(self.segments.len())])
    }
}

fn render(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| s.replace('\\', "\\\\").replace('.', "\\."))
        .collect::<Vec<_>>()
        .join(".")
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render(&self.segments))
    }
}
