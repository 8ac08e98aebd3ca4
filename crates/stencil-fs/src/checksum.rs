//! SHA-256 checksum utilities
//!
//! A single canonical checksum format (`sha256:<hex>`) is recorded in the
//! install ledger and compared on upgrade to tell untouched files from
//! customized ones.

use sha2::{Digest, Sha256};

use crate::{NormalizedPath, Result, io};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the checksum of a file, or `None` if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn compute_file_checksum(path: &NormalizedPath) -> Result<Option<String>> {
    Ok(io::read_text_opt(path)?.map(|content| compute_content_checksum(&content)))
}

/// Whether a checksum string is in the canonical format.
pub fn is_canonical(checksum: &str) -> bool {
    checksum
        .strip_prefix(PREFIX)
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}
