//! Storage operations
//!
//! Resolves the two request kinds against the served root: a listing of its
//! regular files, or the full contents of one file.

use log::{debug, info, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProtocolError, StorageError};
use crate::storage::results::Payload;
use crate::storage::validation::resolve_within_root;

/// Listing sent when the root holds no regular files. Never zero-length.
pub const EMPTY_LISTING: &[u8] = b" ";

/// Serves listings and file contents from one root directory.
#[derive(Debug, Clone)]
pub struct ResourceProvider {
    root: PathBuf,
}

impl ResourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Names of the regular files in the root, one per line, in the order
    /// the filesystem yields them.
    pub fn list_directory(&self) -> Result<Payload, ProtocolError> {
        collect_regular_files(&self.root)
            .map(|names| {
                info!(
                    "Listed directory {} - {} regular files",
                    self.root.display(),
                    names.len()
                );
                encode_listing(&names)
            })
            .map_err(|e| {
                warn!("Failed to list {}: {}", self.root.display(), e);
                ProtocolError::DirectoryReadFailed
            })
    }

    /// Whole contents of `name`. Every failure is reported as a missing file.
    pub fn read_file(&self, name: &str) -> Result<Payload, ProtocolError> {
        load_file(&self.root, name)
            .map(|bytes| {
                info!("Read file {} ({} bytes)", name, bytes.len());
                Payload::new(bytes)
            })
            .map_err(|e| {
                warn!("Cannot serve {}: {}", name, e);
                ProtocolError::FileNotFound
            })
    }
}

fn collect_regular_files(root: &Path) -> Result<Vec<Vec<u8>>, StorageError> {
    let entries = fs::read_dir(root).map_err(StorageError::DirectoryUnreadable)?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(StorageError::DirectoryUnreadable)?;
        // file_type() does not follow symlinks
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {
                names.push(name_bytes(&entry.file_name()));
            }
            Ok(_) => debug!("Skipping non-regular entry {:?}", entry.file_name()),
            Err(e) => debug!("Skipping entry {:?}: {}", entry.file_name(), e),
        }
    }

    Ok(names)
}

/// Raw bytes of a file name, so the listing matches the names on disk.
#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

fn encode_listing(names: &[Vec<u8>]) -> Payload {
    if names.is_empty() {
        return Payload::new(EMPTY_LISTING.to_vec());
    }

    let size = names.iter().map(|n| n.len() + 1).sum();
    let mut listing = Vec::with_capacity(size);
    for name in names {
        listing.extend_from_slice(name);
        listing.push(b'\n');
    }
    Payload::new(listing)
}

fn load_file(root: &Path, name: &str) -> Result<Vec<u8>, StorageError> {
    let path = resolve_within_root(root, name)?;

    let metadata = fs::metadata(&path)?;
    if !metadata.is_file() {
        return Err(StorageError::NotAFile(name.to_string()));
    }

    let bytes = fs::read(&path)?;
    debug!(
        "Loaded {} (stat {} bytes, read {} bytes)",
        path.display(),
        metadata.len(),
        bytes.len()
    );
    Ok(bytes)
}
