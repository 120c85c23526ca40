//! Commit records
//!
//! A commit is an immutable snapshot record. It does not copy the full file
//! set of the repository: `files` holds only the paths changed by this
//! commit, and `inherited` maps every other visible path to the nearest
//! ancestor commit that last changed it.
//!
//! ```text
//! c1  files: {a -> b1}                    inherited: {}
//! c2  files: {b -> b2}                    inherited: {a -> c1}
//! c3  files: {a -> b3}                    inherited: {a -> c1, b -> c2}
//! ```
//!
//! Resolving `a` at `c3` hits `files` first, so `c3`'s own change wins over
//! the inherited entry. Deletions are tombstones: a `files` entry whose blob
//! was never written.

use crate::types::BlobRef;
use crate::utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Immutable snapshot record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    /// Random identifier, fixed at creation
    pub id: String,
    /// Parent commit identifier (None for the root commit)
    pub parent_id: Option<String>,
    /// Commit message
    pub message: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Author recorded at creation
    #[serde(default)]
    pub author: Option<String>,
    /// Paths changed by this commit
    pub files: BTreeMap<PathBuf, BlobRef>,
    /// Path -> ancestor commit that last changed it
    #[serde(rename = "inherited_index")]
    pub inherited: BTreeMap<PathBuf, String>,
}

impl Commit {
    /// Create a new commit on top of `parent`
    ///
    /// The inherited index is the parent's own index with the parent's
    /// changed paths layered over it, each pointing at the parent.
    pub fn new(
        parent: Option<&Commit>,
        message: impl Into<String>,
        author: Option<String>,
        files: BTreeMap<PathBuf, BlobRef>,
    ) -> Self {
        let (parent_id, inherited) = match parent {
            Some(parent) => (Some(parent.id.clone()), Self::inherit_from(parent)),
            None => (None, BTreeMap::new()),
        };

        Self {
            id: utils::new_token(),
            parent_id,
            message: message.into(),
            timestamp: Utc::now(),
            author,
            files,
            inherited,
        }
    }

    /// Inherited index a child of `parent` starts from
    pub fn inherit_from(parent: &Commit) -> BTreeMap<PathBuf, String> {
        let mut inherited = parent.inherited.clone();
        for path in parent.files.keys() {
            inherited.insert(path.clone(), parent.id.clone());
        }
        inherited
    }

    /// Whether this is the root commit
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Short form of the identifier for display
    pub fn short_id(&self) -> &str {
        &self.id[..8.min(self.id.len())]
    }

    /// Commit that owns `path` as seen from this commit
    ///
    /// `Some(self.id)` if this commit changed the path, the ancestor from the
    /// inherited index otherwise.
    pub fn owner_of(&self, path: &Path) -> Option<&str> {
        if self.files.contains_key(path) {
            Some(&self.id)
        } else {
            self.inherited.get(path).map(String::as_str)
        }
    }

    /// Every path this commit can see, including tombstoned ones
    pub fn known_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.inherited
            .keys()
            .filter(move |p| !self.files.contains_key(*p))
            .chain(self.files.keys())
    }
}
