//! Working-tree scanning and change classification
//!
//! The scanner walks the live directory tree under the repository root and
//! compares it with the file set recorded at a commit. Every live or recorded
//! path ends up in at most one of the [`Classification`] sets:
//!
//! - **untracked**: live, unknown to the commit, not staged
//! - **modified**: recorded with different bytes, or the target of a rename
//! - **removed**: recorded, missing from the live tree, not renamed
//!
//! ## Rename detection
//!
//! A live file unknown to the commit whose fingerprint equals that of a
//! recorded path that has vanished from disk is a rename of that path.
//! Rename detection wins over the untracked classification. When several
//! vanished paths share the fingerprint, the first one in path order that has
//! not already been claimed by another rename wins.
//!
//! ## Filtering
//!
//! The metadata directory is never descended into. Configured ignore
//! patterns are glob patterns matched against root-relative paths; a
//! directory that matches is pruned together with its contents. Symbolic
//! links are not followed and are not tracked.

use crate::commit::Commit;
use crate::error::{Result, StrataError};
use crate::graph::CommitGraph;
use crate::storage::Storage;
use crate::types::{Classification, Fingerprint};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Scanner bound to one repository root
#[derive(Debug)]
pub struct WorkingTreeScanner {
    /// Repository root
    root: PathBuf,
    /// Metadata directory name, relative to the root
    metadata_dir: PathBuf,
    /// Compiled ignore patterns
    ignore: GlobSet,
    /// Storage used to fingerprint recorded blobs
    storage: Arc<Storage>,
}

impl WorkingTreeScanner {
    /// Create a scanner for `root`
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidPattern`] if an ignore pattern does not compile
    pub fn new(
        root: PathBuf,
        metadata_dir: &str,
        ignore_patterns: &[String],
        storage: Arc<Storage>,
    ) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in ignore_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| StrataError::InvalidPattern(format!("{}: {}", pattern, e)))?;
            builder.add(glob);
        }
        let ignore = builder
            .build()
            .map_err(|e| StrataError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            root,
            metadata_dir: PathBuf::from(metadata_dir),
            ignore,
            storage,
        })
    }

    /// Whether a root-relative path is excluded from scanning
    pub fn is_ignored(&self, relative: &Path) -> bool {
        relative.starts_with(&self.metadata_dir) || self.ignore.is_match(relative)
    }

    /// Root-relative paths of every regular live file, in path order
    ///
    /// # Errors
    ///
    /// - [`StrataError::WalkDir`] if a directory cannot be read
    pub fn scan(&self) -> Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match entry.path().strip_prefix(&self.root) {
                Ok(relative) if relative.as_os_str().is_empty() => true,
                Ok(relative) => !self.is_ignored(relative),
                Err(_) => false,
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                files.insert(relative.to_path_buf());
            }
        }

        trace!("Scanned {} live file(s)", files.len());
        Ok(files)
    }

    /// Fingerprint of a live file by root-relative path
    pub fn fingerprint(&self, relative: &Path) -> Result<Fingerprint> {
        self.storage.fingerprint(&self.root.join(relative))
    }

    /// Classify the live tree against `commit` and the staged set
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] or [`StrataError::StructureCorruption`] if
    ///   the commit's file set cannot be resolved
    /// - [`StrataError::Io`] if a live file or blob cannot be read
    pub fn classify(
        &self,
        graph: &CommitGraph,
        commit: &Commit,
        staged: &BTreeSet<PathBuf>,
    ) -> Result<Classification> {
        let recorded: BTreeMap<PathBuf, Fingerprint> = graph
            .all_files(commit)?
            .into_iter()
            .map(|(path, blob)| Ok((path, self.storage.fingerprint_blob(&blob)?)))
            .collect::<Result<_>>()?;

        let live = self.scan()?;
        let mut classification = Classification::default();
        let mut claimed: BTreeSet<&PathBuf> = BTreeSet::new();

        for path in &live {
            let fingerprint = self.fingerprint(path)?;

            match recorded.get(path) {
                Some(recorded_fp) => {
                    if *recorded_fp != fingerprint {
                        classification.modified.insert(path.clone());
                    }
                }
                None => {
                    let source = recorded.iter().find(|(old, old_fp)| {
                        **old_fp == fingerprint && !live.contains(*old) && !claimed.contains(old)
                    });

                    if let Some((old, _)) = source {
                        trace!("Detected rename {:?} -> {:?}", old, path);
                        claimed.insert(old);
                        classification.renames.insert(old.clone(), path.clone());
                        classification.modified.insert(path.clone());
                    } else if !staged.contains(path) {
                        classification.untracked.insert(path.clone());
                    }
                }
            }
        }

        for path in recorded.keys() {
            if !live.contains(path) && !claimed.contains(path) {
                classification.removed.insert(path.clone());
            }
        }

        debug!(
            "Classified tree against {}: {} untracked, {} modified, {} removed, {} renamed",
            commit.short_id(),
            classification.untracked.len(),
            classification.modified.len(),
            classification.removed.len(),
            classification.renames.len()
        );
        Ok(classification)
    }
}
