//! Commit graph
//!
//! Creates commits, loads them back, and answers file-set questions that
//! need ancestor records: the full visible file set of a commit and the last
//! version of a single path.
//!
//! ## Caching
//!
//! Resolving a commit's file set loads every ancestor that owns one of its
//! paths. Commits are immutable, so each resolved record is kept in a
//! per-session cache and later lookups skip deserialization entirely.
//!
//! ## Failure model
//!
//! Blobs written by [`CommitGraph::create_commit`] before a failure are not
//! removed; they stay as unreferenced objects.

use crate::commit::Commit;
use crate::error::{Result, StrataError};
use crate::storage::Storage;
use crate::types::{BlobRef, Classification};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Read/write access to the commit graph
#[derive(Debug)]
pub struct CommitGraph {
    /// Storage backend
    storage: Arc<Storage>,
    /// Resolved commits by identifier
    cache: RwLock<HashMap<String, Arc<Commit>>>,
}

/// Files a new commit should record
#[derive(Debug, Clone, Copy)]
pub struct CommitRequest<'a> {
    /// Paths marked for the commit
    pub staged: &'a BTreeSet<PathBuf>,
    /// Working tree against the parent; supplies removals and renames
    pub classification: &'a Classification,
}

impl CommitGraph {
    /// Graph over `storage` with an empty cache
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a commit by identifier
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the commit is absent or its record is unreadable
    pub fn resolve(&self, id: &str) -> Result<Arc<Commit>> {
        if let Some(commit) = self.cache.read().get(id) {
            return Ok(Arc::clone(commit));
        }

        let commit = Arc::new(self.storage.load_commit(id)?);
        self.cache
            .write()
            .insert(id.to_string(), Arc::clone(&commit));
        trace!("Cached commit {}", commit.short_id());
        Ok(commit)
    }

    /// Create and persist a commit on top of `parent`
    ///
    /// For each staged path, in order:
    /// - a rename target reuses the blob its old path last pointed to, and the
    ///   old path gets a tombstone
    /// - a removed (or vanished) path gets a tombstone
    /// - anything else is stored fresh from the live file under `work_root`
    ///
    /// # Errors
    ///
    /// - [`StrataError::Io`] if a blob or the commit record cannot be written
    /// - [`StrataError::StructureCorruption`] if a rename source cannot be resolved
    pub fn create_commit(
        &self,
        parent: Option<&Commit>,
        request: CommitRequest<'_>,
        message: &str,
        author: Option<String>,
        work_root: &Path,
    ) -> Result<Arc<Commit>> {
        let mut files = BTreeMap::new();

        for path in request.staged {
            let rename_source = request.classification.rename_source(path);

            if let (Some(old), Some(parent)) = (rename_source, parent) {
                let blob = self.last_version(parent, old)?;
                trace!("Recording rename {:?} -> {:?}", old, path);
                files.insert(path.clone(), blob);
                files
                    .entry(old.clone())
                    .or_insert_with(|| self.storage.new_blob_ref());
                continue;
            }

            let live = work_root.join(path);
            if request.classification.removed.contains(path) || !live.is_file() {
                trace!("Recording tombstone for {:?}", path);
                files.insert(path.clone(), self.storage.new_blob_ref());
            } else {
                files.insert(path.clone(), self.storage.store_file(&live)?);
            }
        }

        let commit = Commit::new(parent, message, author, files);
        self.storage.save_commit(&commit)?;

        let commit = Arc::new(commit);
        self.cache
            .write()
            .insert(commit.id.clone(), Arc::clone(&commit));
        debug!(
            "Created commit {} with {} changed path(s)",
            commit.short_id(),
            commit.files.len()
        );
        Ok(commit)
    }

    /// Every file visible at `commit`, with the blob holding its content
    ///
    /// Inherited paths resolve through their owning ancestor; the commit's own
    /// changes override them. Tombstoned paths are left out.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if an owning ancestor cannot be loaded
    /// - [`StrataError::StructureCorruption`] if an owner does not record the path
    pub fn all_files(&self, commit: &Commit) -> Result<BTreeMap<PathBuf, BlobRef>> {
        let mut all = BTreeMap::new();

        for path in commit.known_paths() {
            let Some(owner_id) = commit.owner_of(path) else {
                continue;
            };
            let blob = if owner_id == commit.id {
                commit.files.get(path).cloned()
            } else {
                self.resolve(owner_id)?.files.get(path).cloned()
            };
            let blob = blob.ok_or_else(|| {
                StrataError::corruption(format!("commit {} does not record {:?}", owner_id, path))
            })?;
            all.insert(path.clone(), blob);
        }

        all.retain(|_, blob| self.storage.blob_exists(blob));
        Ok(all)
    }

    /// Blob that last recorded `path` as seen from `commit`
    ///
    /// The result may be a tombstone if the path was deleted.
    ///
    /// # Errors
    ///
    /// - [`StrataError::StructureCorruption`] if neither the commit nor the
    ///   ancestor named by its inherited index records the path
    pub fn last_version(&self, commit: &Commit, path: &Path) -> Result<BlobRef> {
        let owner_id = commit.owner_of(path).ok_or_else(|| {
            StrataError::corruption(format!(
                "{:?} is not known to commit {}",
                path,
                commit.short_id()
            ))
        })?;

        let recorded = if owner_id == commit.id {
            commit.files.get(path).cloned()
        } else {
            let owner = self.resolve(owner_id).map_err(|e| {
                StrataError::corruption(format!("owner of {:?} cannot be loaded: {}", path, e))
            })?;
            owner.files.get(path).cloned()
        };

        recorded.ok_or_else(|| {
            StrataError::corruption(format!("commit {} does not record {:?}", owner_id, path))
        })
    }

    /// Walk `n` parent links from `start`
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the walk runs past the root commit
    pub fn nth_ancestor(&self, start: &Arc<Commit>, n: usize) -> Result<Arc<Commit>> {
        let mut current = Arc::clone(start);
        for step in 0..n {
            let parent_id = current.parent_id.clone().ok_or_else(|| {
                StrataError::not_found(format!(
                    "history has only {} commit(s) before {}",
                    step,
                    start.short_id()
                ))
            })?;
            current = self.resolve(&parent_id)?;
        }
        Ok(current)
    }

    /// Commits from `start` back towards the root
    ///
    /// Stops before the commit with identifier `stop` if given, or after the
    /// root commit.
    pub fn history(&self, start: &Arc<Commit>, stop: Option<&str>) -> Result<Vec<Arc<Commit>>> {
        let mut history = Vec::new();
        let mut current = Arc::clone(start);

        loop {
            if stop == Some(current.id.as_str()) {
                break;
            }
            history.push(Arc::clone(&current));
            match &current.parent_id {
                Some(parent_id) => current = self.resolve(parent_id)?,
                None => break,
            }
        }

        Ok(history)
    }
}
