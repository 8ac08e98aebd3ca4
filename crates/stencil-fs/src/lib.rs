//! Filesystem primitives for stencil
//!
//! Provides normalized and project-relative paths, atomic writes and the
//! canonical content checksum used for drift detection.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use constants::StencilPath;
pub use error::{Error, Result};
pub use path::{NormalizedPath, RelPath};
