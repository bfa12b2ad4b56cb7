//! Path normalization utilities for cross-platform file handling.
//!
//! Thin wrapper over [`common::canonicalize_utf8`] so call sites inside this
//! crate can work with `AnatomistError` instead of `common::CommonError`.

use std::path::Path;

use crate::AnatomistError;

/// Normalizes a file path to a canonical UTF-8 string with forward slashes.
///
/// # Errors
/// - `AnatomistError::IoError` if canonicalization fails (missing file, permissions, …)
/// - `AnatomistError::ParseFailure` if the canonical path contains non-UTF-8 bytes
pub fn normalize_path(path: &Path) -> Result<String, AnatomistError> {
    Ok(common::canonicalize_utf8(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_cargo_manifest() {
        let cargo_manifest = std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| Path::new(&dir).join("Cargo.toml"))
            .unwrap();

        let result = normalize_path(&cargo_manifest);
        assert!(result.is_ok());
        let normalized = result.unwrap();

        assert!(normalized.contains('/'));
        assert!(normalized.ends_with("Cargo.toml"));
        assert!(!normalized.contains('\\'));
    }

    #[test]
    fn test_normalize_nonexistent_path() {
        let result = normalize_path(Path::new("/this/does/not/exist/nowhere.py"));
        assert!(result.is_err());
    }
}
