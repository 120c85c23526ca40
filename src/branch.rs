//! Branch registry
//!
//! Maps branch names to commit identifiers and remembers which branch is
//! current. The current-branch name is a plain scalar: nothing forces it to
//! name an existing entry. Removing the current branch leaves it dangling,
//! and a session in that state is treated as detached.

use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Branch name -> commit identifier, plus the current branch name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchTable {
    /// Branch name -> commit identifier
    pub branches: BTreeMap<String, String>,
    /// Name of the selected branch
    #[serde(rename = "current_branch")]
    pub current: String,
}

impl BranchTable {
    /// Empty table with `current` selected
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            branches: BTreeMap::new(),
            current: current.into(),
        }
    }

    /// Create `name` at `head_id` and make it current
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the branch already exists
    pub fn create(&mut self, name: &str, head_id: &str) -> Result<()> {
        if self.branches.contains_key(name) {
            return Err(StrataError::invalid_state(format!(
                "branch {} already exists",
                name
            )));
        }
        self.branches.insert(name.to_string(), head_id.to_string());
        self.current = name.to_string();
        debug!("Created branch {} at {}", name, &head_id[..8.min(head_id.len())]);
        Ok(())
    }

    /// Remove `name` unconditionally, returning whether it existed
    ///
    /// Removing the current branch does not change the current-branch name.
    pub fn remove(&mut self, name: &str) -> bool {
        self.branches.remove(name).is_some()
    }

    /// Branch names in sorted order
    pub fn list(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    /// Current branch name
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Make `name` current
    pub fn set_current(&mut self, name: impl Into<String>) {
        self.current = name.into();
    }

    /// Commit a branch points at
    pub fn get(&self, name: &str) -> Option<&str> {
        self.branches.get(name).map(String::as_str)
    }

    /// Whether `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Point `name` at `commit_id`, creating the entry if needed
    pub fn set(&mut self, name: &str, commit_id: &str) {
        self.branches.insert(name.to_string(), commit_id.to_string());
    }

    /// Commit the current branch points at
    pub fn current_commit(&self) -> Option<&str> {
        self.get(&self.current)
    }

    /// Whether a head at `head_id` is attached to the current branch
    pub fn is_attached(&self, head_id: &str) -> bool {
        self.current_commit() == Some(head_id)
    }
}
