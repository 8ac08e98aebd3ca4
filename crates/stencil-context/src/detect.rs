//! Building a [`ProjectContext`] from what is on disk

use std::collections::BTreeMap;
use std::path::Path;

use stencil_fs::NormalizedPath;

use crate::context::{Languages, ProjectContext};
use crate::{Error, Result, golang, node, python, rust, tooling};

impl ProjectContext {
    /// Inspect `root` and describe the project.
    ///
    /// Fails only when the root itself is unusable. Unreadable or malformed
    /// manifests are logged and treated as absent.
    pub fn detect(root: impl AsRef<Path>) -> Result<Self> {
        let root = check_root(root.as_ref())?;
        tracing::debug!(root = %root, "detecting project context");

        let node = node::detect(&root);
        let python = python::detect(&root);
        let go = golang::detect(&root);
        let rust = rust::detect(&root);

        let languages = Languages {
            javascript: node.present,
            typescript: node.typescript,
            python: python.present,
            go: go.present,
            rust: rust.present,
        };

        // First occurrence of a name wins
        let mut dependencies = BTreeMap::new();
        for (name, version) in node
            .dependencies
            .into_iter()
            .chain(python.dependencies)
            .chain(go.dependencies)
            .chain(rust.dependencies)
        {
            dependencies.entry(name).or_insert(version);
        }

        let tooling = tooling::detect(
            &root,
            &python.tool_sections,
            dependencies.keys().map(String::as_str),
        );
        let is_version_controlled = git2::Repository::discover(root.to_native()).is_ok();

        Ok(ProjectContext::builder(root)
            .languages(languages)
            .tooling(tooling)
            .dependencies(dependencies)
            .js_package_manager(node.package_manager)
            .python_installer(if python.present { python.installer } else { None })
            .version_controlled(is_version_controlled)
            .build())
    }
}

fn check_root(path: &Path) -> Result<NormalizedPath> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RootNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(Error::RootUnreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };
    if !metadata.is_dir() {
        return Err(Error::RootNotDirectory {
            path: path.to_path_buf(),
        });
    }
    if let Err(e) = std::fs::read_dir(path) {
        return Err(Error::RootUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    NormalizedPath::canonicalize(path).map_err(|e| Error::RootUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
