//! Durable repository state
//!
//! The state record holds what a session must remember between invocations:
//! the staged path set, the branch table with the current branch, and the
//! head commit. It is rewritten after every successful mutating operation and
//! reloaded wholesale when a session opens.

use crate::branch::BranchTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Persisted repository state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoState {
    /// Paths marked for inclusion in the next commit
    #[serde(default)]
    pub staged: BTreeSet<PathBuf>,
    /// Branch table and current branch
    #[serde(flatten)]
    pub branches: BranchTable,
    /// Head commit; absent in records that predate detached-head persistence
    #[serde(default)]
    pub head: Option<String>,
}

impl RepoState {
    /// Fresh state with `branch` selected and nothing staged
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            staged: BTreeSet::new(),
            branches: BranchTable::new(branch),
            head: None,
        }
    }

    /// Mark a path for the next commit
    pub fn stage(&mut self, path: PathBuf) -> bool {
        self.staged.insert(path)
    }

    /// Drop a path from the staged set
    pub fn unstage(&mut self, path: &Path) -> bool {
        self.staged.remove(path)
    }

    /// Whether a path is staged
    pub fn is_staged(&self, path: &Path) -> bool {
        self.staged.contains(path)
    }

    /// Clear the staged set
    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    /// Head identifier: the recorded head, else the current branch's commit
    pub fn head_id(&self) -> Option<&str> {
        self.head.as_deref().or_else(|| self.branches.current_commit())
    }
}
