//! Path validation
//!
//! Resolves requested names against the served root and rejects anything
//! that lands outside of it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Resolve `name` relative to `root`, following symlinks, and require the
/// result to stay inside the canonical root.
pub fn resolve_within_root(root: &Path, name: &str) -> Result<PathBuf, StorageError> {
    if name.is_empty() || name.contains('\0') {
        return Err(StorageError::FileNotFound(name.to_string()));
    }

    let canonical_root = root.canonicalize()?;

    // An absolute `name` replaces the root here; the prefix check below rejects it.
    let resolved = match canonical_root.join(name).canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::FileNotFound(name.to_string()));
        }
        Err(e) => return Err(StorageError::IoError(e)),
    };

    if !resolved.starts_with(&canonical_root) {
        return Err(StorageError::PathTraversal(name.to_string()));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_file_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let resolved = resolve_within_root(dir.path(), "a.txt").unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap().join("a.txt"));
    }

    #[test]
    fn rejects_parent_escape() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), b"s").unwrap();

        let err = resolve_within_root(&root, "../secret.txt").unwrap_err();
        assert!(matches!(err, StorageError::PathTraversal(_)));
    }

    #[test]
    fn rejects_absolute_path_outside_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        let secret = outer.path().join("secret.txt");
        fs::write(&secret, b"s").unwrap();

        let err = resolve_within_root(&root, secret.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::PathTraversal(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_within_root(dir.path(), "missing.txt").unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound(_)));
    }
}
