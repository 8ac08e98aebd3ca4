//! Marker-based text patching.
//!
//! Presence is a plain substring test on the marker, never a regex.

/// Where the patch block goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOperation {
    Prepend,
    Append,
}

impl std::fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prepend => write!(f, "prepend"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// A fixed block of text inserted into a user-owned file.
///
/// `content` must contain `marker`; the schema rejects patches where it
/// does not, since they could never be detected as applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub operation: PatchOperation,
    pub content: String,
    pub marker: String,
    pub create_if_missing: bool,
}

impl TextPatch {
    pub fn prepend(content: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            operation: PatchOperation::Prepend,
            content: content.into(),
            marker: marker.into(),
            create_if_missing: false,
        }
    }

    pub fn append(content: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            operation: PatchOperation::Append,
            content: content.into(),
            marker: marker.into(),
            create_if_missing: false,
        }
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// The block as written to disk: `content` with a guaranteed trailing newline.
    pub fn block(&self) -> String {
        if self.content.ends_with('\n') {
            self.content.clone()
        } else {
            format!("{}\n", self.content)
        }
    }

    /// Whether the patch is present in `text`.
    pub fn is_applied(&self, text: &str) -> bool {
        text.contains(&self.marker)
    }

    /// Whether appending to `text` needs a newline in front of the block.
    ///
    /// Callers that want an exact inverse remember this and pass it back to
    /// [`unpatch_text`].
    pub fn needs_separator(&self, text: &str) -> bool {
        self.operation == PatchOperation::Append && !text.is_empty() && !text.ends_with('\n')
    }
}

/// Result of [`patch_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Marker already present; nothing to do.
    AlreadyApplied,
    /// Target absent and the patch may not create it.
    SkippedMissing,
    /// New file content.
    Patched(String),
}

/// Result of [`unpatch_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpatchOutcome {
    /// Marker absent; nothing to remove.
    NotApplied,
    /// Marker present but the block was edited; the file is left alone.
    Modified,
    /// New file content with the block removed.
    Removed(String),
}

/// Apply `patch` to `existing` (`None` when the file does not exist).
pub fn patch_text(existing: Option<&str>, patch: &TextPatch) -> PatchOutcome {
    let Some(text) = existing else {
        return if patch.create_if_missing {
            PatchOutcome::Patched(patch.block())
        } else {
            PatchOutcome::SkippedMissing
        };
    };

    if patch.is_applied(text) {
        return PatchOutcome::AlreadyApplied;
    }

    let block = patch.block();
    let patched = match patch.operation {
        PatchOperation::Prepend => format!("{}{}", block, text),
        PatchOperation::Append if patch.needs_separator(text) => format!("{}\n{}", text, block),
        PatchOperation::Append => format!("{}{}", text, block),
    };
    PatchOutcome::Patched(patched)
}

/// Remove exactly the block `patch` would have inserted.
///
/// Prepended blocks are looked up from the start, appended blocks from the
/// end. Everything else in the file is left byte-for-byte intact, except
/// that `separated` (the append added a newline in front of the block)
/// drops that newline too while the block still ends the file.
pub fn unpatch_text(existing: &str, patch: &TextPatch, separated: bool) -> UnpatchOutcome {
    if !patch.is_applied(existing) {
        return UnpatchOutcome::NotApplied;
    }

    let block = patch.block();
    let found = match patch.operation {
        PatchOperation::Prepend => existing.find(&block),
        PatchOperation::Append => existing.rfind(&block),
    };

    match found {
        Some(idx) => {
            let end = idx + block.len();
            let mut head = &existing[..idx];
            if separated && patch.operation == PatchOperation::Append && end == existing.len() {
                head = head.strip_suffix('\n').unwrap_or(head);
            }
            let mut out = String::with_capacity(existing.len() - block.len());
            out.push_str(head);
            out.push_str(&existing[end..]);
            UnpatchOutcome::Removed(out)
        }
        None => UnpatchOutcome::Modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_gets_trailing_newline() {
        assert_eq!(TextPatch::append("a", "a").block(), "a\n");
        assert_eq!(TextPatch::append("a\n", "a").block(), "a\n");
    }

    #[test]
    fn append_inserts_separator_when_needed() {
        let patch = TextPatch::append("# stencil\n.stencil/cache/", "# stencil");
        assert_eq!(
            patch_text(Some("node_modules"), &patch),
            PatchOutcome::Patched("node_modules\n# stencil\n.stencil/cache/\n".to_string())
        );
    }

    #[test]
    fn separator_goes_away_with_the_block() {
        let patch = TextPatch::append("# stencil\n.stencil/cache/", "# stencil");
        let patched = "node_modules\n# stencil\n.stencil/cache/\n";
        assert!(patch.needs_separator("node_modules"));
        assert_eq!(
            unpatch_text(patched, &patch, true),
            UnpatchOutcome::Removed("node_modules".to_string())
        );
        // without the record the newline is assumed to be the user's
        assert_eq!(
            unpatch_text(patched, &patch, false),
            UnpatchOutcome::Removed("node_modules\n".to_string())
        );
    }

    #[test]
    fn separator_stays_once_user_text_follows_the_block() {
        let patch = TextPatch::append("# stencil\n", "# stencil");
        assert_eq!(
            unpatch_text("a\n# stencil\nb\n", &patch, true),
            UnpatchOutcome::Removed("a\nb\n".to_string())
        );
    }

    #[test]
    fn prepend_puts_block_first() {
        let patch = TextPatch::prepend("@AGENTS.md", "@AGENTS.md");
        assert_eq!(
            patch_text(Some("# Notes\n"), &patch),
            PatchOutcome::Patched("@AGENTS.md\n# Notes\n".to_string())
        );
    }

    #[test]
    fn edited_block_is_not_removed() {
        let patch = TextPatch::append("# stencil\nfoo\n", "# stencil");
        assert_eq!(
            unpatch_text("x\n# stencil\nbar\n", &patch, false),
            UnpatchOutcome::Modified
        );
    }
}
