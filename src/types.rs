//! Core data types used throughout the Strata library
//!
//! This module contains the configuration record, the persisted storage
//! metadata, and the outcome types returned by engine operations.
//!
//! ## Overview
//!
//! - **Configuration**: [`StrataConfig`], persisted inside [`StorageMetadata`]
//! - **References**: [`BlobRef`], [`Fingerprint`]
//! - **Working tree**: [`Classification`] (transient, never persisted)
//! - **Outcomes**: [`StatusReport`], [`CheckoutOutcome`], [`RestoreSummary`],
//!   [`DiscardOutcome`], [`MergeOutcome`], [`LogEntry`], [`HeadState`]
//!
//! Every outcome implements [`std::fmt::Display`] so a command dispatcher can
//! print it without knowing its structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default name of the branch created by `init`
pub const DEFAULT_BRANCH: &str = "master";

/// Default name of the metadata directory inside the repository root
pub const DEFAULT_METADATA_DIR: &str = ".strata";

/// Default head-relative revision prefix (`HEAD~2` walks two parents)
pub const DEFAULT_HEAD_PREFIX: &str = "HEAD~";

/// Repository configuration
///
/// Persisted at `init` time and reloaded on every open, so the values a
/// repository was created with stay in force for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrataConfig {
    /// Name of the branch created by `init`
    pub default_branch: String,
    /// Name of the metadata directory (relative to the root)
    pub metadata_dir: String,
    /// Glob patterns, relative to the root, excluded from scanning
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Prefix of head-relative revision tokens
    pub head_prefix: String,
    /// Author recorded on new commits (falls back to the environment)
    #[serde(default)]
    pub author: Option<String>,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            ignore_patterns: Vec::new(),
            head_prefix: DEFAULT_HEAD_PREFIX.to_string(),
            author: None,
        }
    }
}

/// Metadata stored at the top of the metadata directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageMetadata {
    /// Storage format version
    pub format_version: u32,
    /// Version of strata that created the repository
    pub strata_version: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last time the repository was opened
    pub last_accessed: DateTime<Utc>,
    /// Repository configuration
    pub config: StrataConfig,
}

/// Reference to a stored blob
///
/// A blob reference is a random token; the blob it names may not exist, in
/// which case the reference is a tombstone marking a deleted path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub String);

impl BlobRef {
    /// Underlying token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content digest used only for equality comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub String);

/// Classification of the live tree relative to a commit and the staged set
///
/// Recomputed on demand by the scanner and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Live files unknown to the commit and not staged
    pub untracked: BTreeSet<PathBuf>,
    /// Recorded files whose bytes changed, plus rename targets
    pub modified: BTreeSet<PathBuf>,
    /// Recorded files missing from the live tree (and not renamed)
    pub removed: BTreeSet<PathBuf>,
    /// Detected renames, old path -> new path
    pub renames: BTreeMap<PathBuf, PathBuf>,
}

impl Classification {
    /// Old path of a rename whose target is `path`
    pub fn rename_source(&self, path: &Path) -> Option<&PathBuf> {
        self.renames
            .iter()
            .find(|(_, new)| new.as_path() == path)
            .map(|(old, _)| old)
    }

    /// Whether `add` accepts this path
    pub fn is_addable(&self, path: &Path) -> bool {
        self.untracked.contains(path) || self.modified.contains(path) || self.removed.contains(path)
    }
}

/// Whether the session is attached to a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// No repository at this root yet
    Uninitialized,
    /// Head equals the current branch's recorded commit
    Attached(String),
    /// Head differs from the current branch's commit (holds the head id)
    Detached(String),
}

impl HeadState {
    /// Whether writes are allowed
    pub fn is_attached(&self) -> bool {
        matches!(self, HeadState::Attached(_))
    }
}

/// Result of `status`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Current branch name
    pub branch: String,
    /// Untracked files
    pub untracked: BTreeSet<PathBuf>,
    /// Modified files not yet staged
    pub modified: BTreeSet<PathBuf>,
    /// Removed files not yet staged
    pub removed: BTreeSet<PathBuf>,
    /// Staged paths that are new to the commit
    pub staged_new: BTreeSet<PathBuf>,
    /// Staged paths with modified content
    pub staged_modified: BTreeSet<PathBuf>,
    /// Staged removals
    pub staged_removed: BTreeSet<PathBuf>,
}

impl StatusReport {
    /// Total number of staged paths
    pub fn staged_count(&self) -> usize {
        self.staged_new.len() + self.staged_modified.len() + self.staged_removed.len()
    }

    /// Nothing untracked, pending or staged
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty()
            && self.modified.is_empty()
            && self.removed.is_empty()
            && self.staged_count() == 0
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, paths: &BTreeSet<PathBuf>) -> fmt::Result {
    if !paths.is_empty() {
        writeln!(f, "{}:", title)?;
        for p in paths {
            writeln!(f, "  {}", p.display())?;
        }
    }
    Ok(())
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current branch is {}", self.branch)?;
        if self.is_clean() {
            return writeln!(f, "Everything up to date");
        }
        write_section(f, "Untracked files", &self.untracked)?;
        write_section(f, "Modified files", &self.modified)?;
        write_section(f, "Removed files", &self.removed)?;
        if self.staged_count() > 0 {
            writeln!(f, "Ready to commit:")?;
            for p in &self.staged_new {
                writeln!(f, "  new file: {}", p.display())?;
            }
            for p in &self.staged_modified {
                writeln!(f, "  modified: {}", p.display())?;
            }
            for p in &self.staged_removed {
                writeln!(f, "  removed: {}", p.display())?;
            }
        }
        Ok(())
    }
}

/// Summary of a file materialization (checkout or reset)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Commit the working tree now reflects
    pub commit_id: String,
    /// Files copied from storage
    pub files_written: usize,
    /// Live files deleted
    pub files_deleted: usize,
    /// Branch the session is attached to afterwards, if any
    pub branch: Option<String>,
}

impl fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "At {} ({} written, {} deleted)",
            &self.commit_id[..8.min(self.commit_id.len())],
            self.files_written,
            self.files_deleted
        )?;
        match &self.branch {
            Some(branch) => write!(f, " on branch {}", branch),
            None => write!(f, ", head is detached"),
        }
    }
}

/// Result of `checkout`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Working tree switched to the target
    Completed(RestoreSummary),
    /// Staged or modified files block the switch; nothing was touched
    Refused {
        /// Staged paths
        staged: Vec<PathBuf>,
        /// Modified paths
        modified: Vec<PathBuf>,
    },
}

impl fmt::Display for CheckoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutOutcome::Completed(summary) => write!(f, "Checkout completed: {}", summary),
            CheckoutOutcome::Refused { .. } => write!(f, "Stash your changes"),
        }
    }
}

/// Result of `checkout -- <paths>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardOutcome {
    /// Paths restored to their last committed content
    pub restored: Vec<PathBuf>,
    /// Staged paths left untouched
    pub skipped: Vec<PathBuf>,
}

impl fmt::Display for DiscardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Restored {} file(s)", self.restored.len())?;
        if !self.skipped.is_empty() {
            write!(f, ", skipped {} staged file(s)", self.skipped.len())?;
        }
        Ok(())
    }
}

/// Result of `merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merge commit created
    Merged {
        /// Identifier of the merge commit
        commit_id: String,
        /// Paths whose foreign bytes were appended to the local file
        conflicts: Vec<PathBuf>,
        /// Paths copied in from the merged branch
        added: Vec<PathBuf>,
    },
    /// Staged or modified files block the merge; nothing was touched
    Refused {
        /// Staged paths
        staged: Vec<PathBuf>,
        /// Modified paths
        modified: Vec<PathBuf>,
    },
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Merged { commit_id, conflicts, added } => {
                for p in conflicts {
                    writeln!(f, "Fix {}", p.display())?;
                }
                write!(
                    f,
                    "Merge completed as {} ({} added, {} conflicting)",
                    &commit_id[..8.min(commit_id.len())],
                    added.len(),
                    conflicts.len()
                )
            }
            MergeOutcome::Refused { .. } => write!(f, "Stash your changes"),
        }
    }
}

/// One line of history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Commit identifier
    pub id: String,
    /// Author recorded on the commit
    pub author: Option<String>,
    /// Commit message
    pub message: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commit {}", self.id)?;
        if let Some(author) = &self.author {
            writeln!(f, "Author: {}", author)?;
        }
        writeln!(f, "Date: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S %Z"))?;
        writeln!(f)?;
        writeln!(f, "    {}", self.message)
    }
}
