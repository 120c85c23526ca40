//! On-disk storage for Strata
//!
//! This module owns everything under the metadata directory: file blobs,
//! commit records, the repository state record and the storage metadata.
//!
//! ## Architecture
//!
//! ```text
//! .strata/
//! ├── metadata.json          # Storage metadata and configuration
//! ├── state.json             # Staged set, branch table, current branch, head
//! ├── commits/
//! │   └── <commit_id>.json   # One record per commit
//! └── objects/               # File blobs (sharded)
//!     └── <prefix>/          # First 2 chars of the blob reference
//!         └── <suffix>       # Remaining characters
//! ```
//!
//! ## Blobs
//!
//! Blobs are written once and never overwritten. A blob reference is a random
//! token, not a content hash, so storing the same bytes twice yields two
//! blobs. A reference whose object file does not exist is a tombstone.
//!
//! ## Fingerprints
//!
//! [`Storage::fingerprint`] and [`Storage::fingerprint_blob`] return SHA-256
//! digests used only to compare content while diffing the working tree.

use crate::commit::Commit;
use crate::error::{Result, StrataError};
use crate::state::RepoState;
use crate::types::{BlobRef, Fingerprint, StorageMetadata, StrataConfig};
use crate::utils;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

const METADATA_FILE: &str = "metadata.json";
const STATE_FILE: &str = "state.json";
const COMMITS_DIR: &str = "commits";
const OBJECTS_DIR: &str = "objects";

/// Storage backend rooted at the metadata directory
#[derive(Debug, Clone)]
pub struct Storage {
    /// Metadata directory
    root: PathBuf,
}

impl Storage {
    /// Handle on the metadata directory at `root`
    ///
    /// Performs no I/O; use [`Storage::is_initialized`] to find out whether a
    /// repository exists there.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Metadata directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a repository has been initialized here
    pub fn is_initialized(&self) -> bool {
        self.root.join(METADATA_FILE).is_file()
    }

    /// Create the directory structure and write the metadata record
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the repository already exists
    /// - [`StrataError::Io`] if filesystem operations fail
    pub fn initialize(&self, config: &StrataConfig) -> Result<StorageMetadata> {
        if self.is_initialized() {
            return Err(StrataError::invalid_state("repository already exists"));
        }

        fs::create_dir_all(self.root.join(COMMITS_DIR))?;
        fs::create_dir_all(self.root.join(OBJECTS_DIR))?;

        let metadata = StorageMetadata {
            format_version: FORMAT_VERSION,
            strata_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            last_accessed: Utc::now(),
            config: config.clone(),
        };
        self.write_metadata(&metadata)?;

        info!("Initialized storage at {:?}", self.root);
        Ok(metadata)
    }

    /// Load the metadata record and bump its access time
    pub fn load_metadata(&self) -> Result<StorageMetadata> {
        let json = fs::read_to_string(self.root.join(METADATA_FILE))?;
        let mut metadata: StorageMetadata = serde_json::from_str(&json)?;
        if metadata.format_version > FORMAT_VERSION {
            warn!(
                "Repository format {} is newer than supported format {}",
                metadata.format_version, FORMAT_VERSION
            );
        }
        metadata.last_accessed = Utc::now();
        if let Err(e) = self.write_metadata(&metadata) {
            warn!("Failed to update last access time: {}", e);
        }
        Ok(metadata)
    }

    fn write_metadata(&self, metadata: &StorageMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)?;
        utils::atomic_write(&self.root.join(METADATA_FILE), json.as_bytes())
    }

    // Blobs

    /// Allocate a fresh blob reference without writing anything
    ///
    /// Used on its own, the reference is a tombstone.
    pub fn new_blob_ref(&self) -> BlobRef {
        BlobRef(utils::new_token())
    }

    /// Object path of a blob reference
    pub fn blob_path(&self, blob: &BlobRef) -> PathBuf {
        let token = blob.as_str();
        let split = 2.min(token.len());
        self.root
            .join(OBJECTS_DIR)
            .join(&token[..split])
            .join(&token[split..])
    }

    /// Whether the blob was written (false for tombstones)
    pub fn blob_exists(&self, blob: &BlobRef) -> bool {
        self.blob_path(blob).is_file()
    }

    /// Store bytes as a new blob
    ///
    /// # Errors
    ///
    /// - [`StrataError::Io`] on write failure
    pub fn store(&self, content: &[u8]) -> Result<BlobRef> {
        let blob = self.new_blob_ref();
        let object_path = self.blob_path(&blob);
        if let Some(dir) = object_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&object_path)?;
        file.write_all(content)?;

        trace!("Stored blob {} ({} bytes)", blob, content.len());
        Ok(blob)
    }

    /// Store the content of a live file as a new blob
    pub fn store_file(&self, path: &Path) -> Result<BlobRef> {
        let content = fs::read(path)?;
        self.store(&content)
    }

    /// Read a blob's bytes
    pub fn read_blob(&self, blob: &BlobRef) -> Result<Vec<u8>> {
        fs::read(self.blob_path(blob)).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => StrataError::not_found(format!("blob {}", blob)),
            _ => StrataError::Io(e),
        })
    }

    /// Fingerprint of a live file
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        Ok(Fingerprint(utils::hash_file_content(path)?))
    }

    /// Fingerprint of a stored blob
    pub fn fingerprint_blob(&self, blob: &BlobRef) -> Result<Fingerprint> {
        self.fingerprint(&self.blob_path(blob))
    }

    /// Copy a blob's bytes to a live path
    ///
    /// Parent directories are created as needed. The destination must not
    /// exist; callers that intend to overwrite remove it first.
    ///
    /// # Errors
    ///
    /// - [`StrataError::Io`] with kind `AlreadyExists` on collision
    /// - [`StrataError::Io`] on read or write failure
    pub fn materialize(&self, blob: &BlobRef, destination: &Path) -> Result<u64> {
        let content = self.read_blob(blob)?;
        if let Some(dir) = destination.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)?;
        file.write_all(&content)?;

        trace!("Materialized blob {} at {:?}", blob, destination);
        Ok(content.len() as u64)
    }

    // Commit records

    fn commit_path(&self, id: &str) -> PathBuf {
        self.root.join(COMMITS_DIR).join(format!("{}.json", id))
    }

    /// Persist a commit record
    pub fn save_commit(&self, commit: &Commit) -> Result<()> {
        let json = serde_json::to_string_pretty(commit)?;
        let path = self.commit_path(&commit.id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        utils::atomic_write(&path, json.as_bytes())?;
        debug!("Saved commit {}", commit.short_id());
        Ok(())
    }

    /// Load a commit record
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the record is absent or unreadable
    pub fn load_commit(&self, id: &str) -> Result<Commit> {
        if id.is_empty() || id.contains(|c: char| matches!(c, '/' | '\\' | '.')) {
            return Err(StrataError::not_found(format!("commit '{}'", id)));
        }

        let json = fs::read_to_string(self.commit_path(id)).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => StrataError::not_found(format!("commit '{}'", id)),
            _ => StrataError::Io(e),
        })?;

        serde_json::from_str(&json).map_err(|e| {
            warn!("Commit record {} is unreadable: {}", id, e);
            StrataError::not_found(format!("commit '{}' (unreadable record)", id))
        })
    }

    // State record

    /// Persist the repository state
    pub fn save_state(&self, state: &RepoState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        utils::atomic_write(&self.root.join(STATE_FILE), json.as_bytes())?;
        trace!("Saved state ({} staged)", state.staged.len());
        Ok(())
    }

    /// Load the repository state, if one was ever written
    pub fn load_state(&self) -> Result<Option<RepoState>> {
        let path = self.root.join(STATE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}
