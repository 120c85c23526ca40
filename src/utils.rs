//! Utility functions for Strata
//!
//! Hashing helpers, atomic file writes, random token generation and the path
//! normalization used to turn user-supplied paths into logical,
//! root-relative repository paths.

use crate::error::{Result, StrataError};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Hash a file's content using SHA-256
///
/// Reads the file through an 8KB buffer so large files are never held in
/// memory at once.
///
/// # Errors
///
/// - [`StrataError::Io`] if the file cannot be opened or read
pub fn hash_file_content(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Generate a fresh random identifier
///
/// 32 lowercase hexadecimal characters drawn from a v4 UUID. Identifiers are
/// independent of any content, so two identical commits never share one.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Write a file atomically
///
/// Content goes to a temporary file in the destination directory, which is
/// then renamed over the target. Readers see either the old or the new file.
///
/// # Errors
///
/// - [`StrataError::Io`] if the temporary file cannot be written or persisted
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StrataError::Io(e.error))?;
    Ok(())
}

/// Remove directory if empty
pub fn remove_dir_if_empty(path: &Path) -> Result<bool> {
    if path.is_dir() && fs::read_dir(path)?.next().is_none() {
        fs::remove_dir(path)?;
        trace!("Removed empty directory: {:?}", path);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Remove the now-empty parent directories of `file`, stopping at `root`
pub fn prune_empty_parents(file: &Path, root: &Path) -> Result<()> {
    let mut parent = file.parent();
    while let Some(dir) = parent {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        if !remove_dir_if_empty(dir)? {
            break;
        }
        parent = dir.parent();
    }
    Ok(())
}

/// Turn a user-supplied path into a logical repository path
///
/// Absolute paths must lie under `root`; relative paths are taken relative to
/// `root`. `.` components are dropped. The result never contains `..` and
/// never points into the metadata directory.
///
/// # Errors
///
/// - [`StrataError::NotFound`] if the path escapes the root, is empty, or
///   names the metadata directory
pub fn to_logical_path(input: &Path, root: &Path, metadata_dir: &str) -> Result<PathBuf> {
    let relative = if input.is_absolute() {
        input
            .strip_prefix(root)
            .map_err(|_| StrataError::not_found(format!("{} is outside the repository", input.display())))?
    } else {
        input
    };

    let mut logical = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => logical.push(part),
            Component::CurDir => {}
            _ => {
                return Err(StrataError::not_found(format!(
                    "{} is not a repository path",
                    input.display()
                )))
            }
        }
    }

    if logical.as_os_str().is_empty() {
        return Err(StrataError::not_found("empty path"));
    }
    if logical.starts_with(metadata_dir) {
        return Err(StrataError::not_found(format!(
            "{} is inside the metadata directory",
            input.display()
        )));
    }
    Ok(logical)
}

/// Author recorded on commits when none is configured
pub fn default_author() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .or_else(|| hostname::get().ok().map(|h| h.to_string_lossy().to_string()))
}
