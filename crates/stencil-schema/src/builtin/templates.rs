//! Template bodies embedded in the binary

pub(crate) const GUIDE: &str = "\
# Project Guide

This directory is maintained by stencil. Files here are regenerated on
every upgrade; put your own notes somewhere else.

- `hooks/` holds scripts wired into your editor and agent settings.
- `guides/` holds reference material for contributors and agents.
";

pub(crate) const CHECK_COMMAND: &str = "\
---
description: Run the project checks before handing work back
---

Run `sh .stencil/hooks/pre-commit.sh` and fix every reported problem.
Do not disable rules to make the checks pass.
";

pub(crate) const DECISION_TEMPLATE: &str = "\
# NNNN: Title

## Status

Proposed

## Context

## Decision

## Consequences
";

pub(crate) const EDITORCONFIG: &str = "\
root = true

[*]
charset = utf-8
end_of_line = lf
insert_final_newline = true
trim_trailing_whitespace = true
indent_style = space
indent_size = 2

[*.{py,rs,go}]
indent_size = 4

[*.go]
indent_style = tab

[Makefile]
indent_style = tab
";
