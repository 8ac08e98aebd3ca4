//! The version marker: one line naming the schema version last applied

use semver::Version;
use stencil_fs::{NormalizedPath, StencilPath};

use crate::{Error, Result};

pub fn path(root: &NormalizedPath) -> NormalizedPath {
    root.join(StencilPath::VersionMarker.as_str())
}

/// Read the installed schema version. `None` means no prior install.
///
/// # Errors
///
/// [`Error::InvalidMarker`] when the file holds anything but a version.
pub fn read(root: &NormalizedPath) -> Result<Option<Version>> {
    let path = path(root);
    let Some(content) = stencil_fs::io::read_text_opt(&path)? else {
        return Ok(None);
    };
    let trimmed = content.trim();
    Version::parse(trimmed)
        .map(Some)
        .map_err(|_| Error::InvalidMarker {
            path: path.to_native(),
            content: trimmed.to_string(),
        })
}

/// File content for `version`.
pub fn content(version: &Version) -> String {
    format!("{version}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_marker_means_not_installed() {
        let dir = tempdir().unwrap();
        assert_eq!(read(&NormalizedPath::new(dir.path())).unwrap(), None);
    }

    #[test]
    fn marker_content_reads_back() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".stencil")).unwrap();
        let root = NormalizedPath::new(dir.path());

        std::fs::write(
            dir.path().join(".stencil/version"),
            content(&Version::new(1, 2, 3)),
        )
        .unwrap();
        assert_eq!(read(&root).unwrap(), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn garbage_marker_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".stencil")).unwrap();
        std::fs::write(dir.path().join(".stencil/version"), "latest\n").unwrap();

        let err = read(&NormalizedPath::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::InvalidMarker { .. }));
    }
}
