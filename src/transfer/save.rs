//! Persisting downloaded files without overwriting existing ones.

use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Name tried for the `n`th collision: `report.txt` → `report.txt~n~`.
pub fn dedup_candidate(filename: &str, n: u64) -> String {
    if n == 0 {
        filename.to_string()
    } else {
        format!("{}~{}~", filename, n)
    }
}

/// Writes `bytes` to `dir/filename`, or to the first free `filename~N~`.
///
/// Each candidate is opened create-exclusive, so an existing file is never
/// truncated even if it appears between two attempts.
pub fn save_with_dedup(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
    if filename.is_empty() {
        return Err(StorageError::NotAFile(filename.to_string()));
    }

    let mut n = 0u64;
    loop {
        let path = dir.join(dedup_candidate(filename, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                fill_or_remove(file, &path, bytes)?;
                info!("Saved {} bytes to {}", bytes.len(), path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} already exists, trying next suffix", path.display());
                n += 1;
            }
            Err(e) => return Err(StorageError::IoError(e)),
        }
    }
}

/// Writes `bytes` to a freshly created `path`. On failure the partial file
/// is removed.
fn fill_or_remove<W: Write>(mut writer: W, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let written = writer.write_all(bytes).and_then(|()| writer.flush());
    drop(writer);

    if let Err(e) = written {
        warn!("Failed to write {}: {}", path.display(), e);
        if let Err(rm) = fs::remove_file(path) {
            warn!("Failed to remove partial file {}: {}", path.display(), rm);
        }
        return Err(StorageError::IoError(e));
    }
    Ok(())
}
