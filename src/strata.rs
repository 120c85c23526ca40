//! Repository session
//!
//! [`Strata`] is the engine a caller drives: one value per repository root,
//! holding the loaded configuration, the repository state and the head
//! commit. Every operation takes the session explicitly; nothing is global.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized --init--> Attached(branch) <--checkout branch--> Detached
//! ```
//!
//! A session is attached when its head equals the commit the current branch
//! records, and detached otherwise. The distinction is recomputed on demand
//! from the persisted head and branch table rather than stored.
//!
//! ## Failure model
//!
//! Multi-step operations (checkout, reset, merge) that fail while rewriting
//! the working tree leave it in a mixed state; the error is returned and no
//! rollback is attempted. State is persisted only after an operation
//! succeeds, so a failed operation leaves the previous state record intact.
//!
//! ## Example
//!
//! ```rust,no_run
//! use strata::Strata;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut repo = Strata::open("./project")?;
//! repo.init()?;
//! std::fs::write("./project/a.txt", "x")?;
//! repo.add(&["a.txt"])?;
//! repo.commit("c1")?;
//! print!("{}", repo.status()?);
//! # Ok(())
//! # }
//! ```

use crate::commit::Commit;
use crate::error::{Result, StrataError};
use crate::graph::{CommitGraph, CommitRequest};
use crate::revision::Revision;
use crate::scanner::WorkingTreeScanner;
use crate::state::RepoState;
use crate::storage::Storage;
use crate::types::*;
use crate::utils;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Repository session
pub struct Strata {
    /// Working-tree root
    root_path: PathBuf,
    /// Effective configuration
    config: StrataConfig,
    /// Blob, commit and state storage
    storage: Arc<Storage>,
    /// Commit graph with its session cache
    graph: CommitGraph,
    /// Working-tree scanner
    scanner: WorkingTreeScanner,
    /// Staged set, branch table and current branch
    state: RepoState,
    /// Commit the working tree is derived from
    head: Option<Arc<Commit>>,
}

impl std::fmt::Debug for Strata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strata")
            .field("root_path", &self.root_path)
            .field("current_branch", &self.state.branches.current())
            .field("head", &self.head.as_ref().map(|c| c.short_id().to_string()))
            .field("staged", &self.state.staged.len())
            .finish()
    }
}

impl Strata {
    /// Open a session on `root` with the default configuration
    ///
    /// Works on both initialized and uninitialized roots; in the latter case
    /// only [`Strata::init`] succeeds.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        StrataBuilder::new().open(root)
    }

    fn from_config(root_path: PathBuf, builder_config: StrataConfig) -> Result<Self> {
        if !root_path.is_dir() {
            return Err(StrataError::not_found(format!(
                "repository root {}",
                root_path.display()
            )));
        }

        let storage = Arc::new(Storage::new(root_path.join(&builder_config.metadata_dir)));
        let graph = CommitGraph::new(Arc::clone(&storage));

        let (config, state, head) = if storage.is_initialized() {
            let mut config = storage.load_metadata()?.config;
            config.metadata_dir = builder_config.metadata_dir;

            let state = storage
                .load_state()?
                .unwrap_or_else(|| RepoState::new(config.default_branch.clone()));

            let head = match state.head_id() {
                Some(id) => match graph.resolve(id) {
                    Ok(commit) => Some(commit),
                    Err(e) => {
                        warn!("State references head {} which cannot be loaded: {}", id, e);
                        None
                    }
                },
                None => None,
            };
            (config, state, head)
        } else {
            let state = RepoState::new(builder_config.default_branch.clone());
            (builder_config, state, None)
        };

        let scanner = WorkingTreeScanner::new(
            root_path.clone(),
            &config.metadata_dir,
            &config.ignore_patterns,
            Arc::clone(&storage),
        )?;

        debug!("Opened session on {:?} (metadata in {:?})", root_path, storage.root());
        Ok(Self {
            root_path,
            config,
            storage,
            graph,
            scanner,
            state,
            head,
        })
    }

    // Accessors

    /// Working-tree root
    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Effective configuration
    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// Current head commit, if one is loaded
    pub fn head(&self) -> Option<&Arc<Commit>> {
        self.head.as_ref()
    }

    /// Name of the current branch
    pub fn current_branch(&self) -> &str {
        self.state.branches.current()
    }

    /// Staged paths
    pub fn staged(&self) -> &BTreeSet<PathBuf> {
        &self.state.staged
    }

    /// Whether the session is attached, detached or uninitialized
    pub fn head_state(&self) -> HeadState {
        if !self.storage.is_initialized() {
            return HeadState::Uninitialized;
        }
        match self.state.head_id() {
            Some(id) if self.state.branches.is_attached(id) => {
                HeadState::Attached(self.state.branches.current().to_string())
            }
            Some(id) => HeadState::Detached(id.to_string()),
            None => HeadState::Uninitialized,
        }
    }

    // Guards

    fn require_initialized(&self) -> Result<()> {
        if self.storage.is_initialized() {
            Ok(())
        } else {
            Err(StrataError::invalid_state("repository not initialized"))
        }
    }

    fn require_attached(&self) -> Result<()> {
        match self.head_state() {
            HeadState::Attached(_) => Ok(()),
            HeadState::Detached(_) => Err(StrataError::invalid_state("head is detached")),
            HeadState::Uninitialized => Err(StrataError::invalid_state("repository not initialized")),
        }
    }

    fn require_head(&self) -> Result<Arc<Commit>> {
        match (&self.head, self.state.head_id()) {
            (Some(head), _) => Ok(Arc::clone(head)),
            (None, Some(id)) => Err(StrataError::corruption(format!(
                "head commit {} cannot be loaded",
                id
            ))),
            (None, None) => Err(StrataError::corruption("repository has no head commit")),
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.state.head = self.head.as_ref().map(|c| c.id.clone());
        self.storage.save_state(&self.state)
    }

    fn logical_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<PathBuf>> {
        paths
            .iter()
            .map(|p| utils::to_logical_path(p.as_ref(), &self.root_path, &self.config.metadata_dir))
            .collect()
    }

    /// Delete a live file, tolerating its absence, and prune empty parents
    fn delete_live(&self, path: &Path) -> Result<bool> {
        let live = self.root_path.join(path);
        match fs::remove_file(&live) {
            Ok(()) => {
                utils::prune_empty_parents(&live, &self.root_path)?;
                trace!("Deleted {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn classify_head(&self, head: &Commit) -> Result<Classification> {
        self.scanner.classify(&self.graph, head, &self.state.staged)
    }

    // Operations

    /// Create the repository with its default branch and an empty initial commit
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if a repository already exists here
    #[instrument(skip(self))]
    pub fn init(&mut self) -> Result<Arc<Commit>> {
        if self.storage.is_initialized() {
            return Err(StrataError::invalid_state("repository already exists"));
        }

        self.storage.initialize(&self.config)?;
        self.state = RepoState::new(self.config.default_branch.clone());
        self.head = None;

        let commit = self.commit_staged("Initial commit")?;
        info!(
            "Initialized repository at {:?} on branch {}",
            self.root_path, self.config.default_branch
        );
        Ok(commit)
    }

    /// Stage paths for the next commit
    ///
    /// Every path must be untracked, modified or removed relative to head.
    /// Paths already staged are accepted again. Nothing is staged unless all
    /// paths qualify.
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the head is detached
    /// - [`StrataError::NotFound`] if a path has nothing to stage
    #[instrument(skip(self, paths))]
    pub fn add<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>> {
        self.require_attached()?;
        let head = self.require_head()?;
        let logical = self.logical_paths(paths)?;
        let classification = self.classify_head(&head)?;

        for path in &logical {
            if !classification.is_addable(path) && !self.state.is_staged(path) {
                return Err(StrataError::not_found(format!(
                    "{} has no changes to stage",
                    path.display()
                )));
            }
        }

        for path in &logical {
            if self.state.stage(path.clone()) {
                trace!("Staged {:?}", path);
            }
        }
        self.persist()?;

        info!("Staged {} path(s)", logical.len());
        Ok(logical)
    }

    /// Stop tracking paths
    ///
    /// A path tracked at head has its live file deleted and is staged, so the
    /// next commit records the deletion. A path that is only staged is
    /// unstaged and its live file is left alone.
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the head is detached
    /// - [`StrataError::NotFound`] if a path is neither tracked nor staged
    #[instrument(skip(self, paths))]
    pub fn remove<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>> {
        self.require_attached()?;
        let head = self.require_head()?;
        let logical = self.logical_paths(paths)?;
        let tracked = self.graph.all_files(&head)?;

        for path in &logical {
            if !tracked.contains_key(path) && !self.state.is_staged(path) {
                return Err(StrataError::not_found(format!(
                    "{} is not tracked",
                    path.display()
                )));
            }
        }

        for path in &logical {
            if tracked.contains_key(path) {
                self.delete_live(path)?;
                self.state.stage(path.clone());
                debug!("Removed tracked path {:?}", path);
            } else {
                self.state.unstage(path);
                debug!("Unstaged {:?}", path);
            }
        }
        self.persist()?;

        info!("Removed {} path(s)", logical.len());
        Ok(logical)
    }

    /// Record the staged set as a new commit on the current branch
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the head is detached
    /// - [`StrataError::StructureCorruption`] if the recorded head cannot be loaded
    /// - [`StrataError::Io`] if blobs or the commit record cannot be written
    #[instrument(skip(self))]
    pub fn commit(&mut self, message: &str) -> Result<Arc<Commit>> {
        self.require_initialized()?;
        if self.state.head_id().is_some() {
            self.require_head()?;
            self.require_attached()?;
        }
        self.commit_staged(message)
    }

    fn commit_staged(&mut self, message: &str) -> Result<Arc<Commit>> {
        let parent = self.head.clone();
        let classification = match &parent {
            Some(head) => self.classify_head(head)?,
            None => Classification::default(),
        };
        let author = self.config.author.clone().or_else(utils::default_author);

        let commit = self.graph.create_commit(
            parent.as_deref(),
            CommitRequest {
                staged: &self.state.staged,
                classification: &classification,
            },
            message,
            author,
            &self.root_path,
        )?;

        let branch = self.state.branches.current().to_string();
        self.state.branches.set(&branch, &commit.id);
        self.state.clear_staged();
        self.head = Some(Arc::clone(&commit));
        self.persist()?;

        info!(
            "Committed {} on {} ({} path(s))",
            commit.short_id(),
            branch,
            commit.files.len()
        );
        Ok(commit)
    }

    /// Classify the working tree against head
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the head is detached
    #[instrument(skip(self))]
    pub fn status(&self) -> Result<StatusReport> {
        self.require_attached()?;
        let head = self.require_head()?;
        let classification = self.classify_head(&head)?;
        let recorded = self.graph.all_files(&head)?;

        let mut report = StatusReport {
            branch: self.state.branches.current().to_string(),
            untracked: classification.untracked,
            ..Default::default()
        };

        for path in &self.state.staged {
            if !self.root_path.join(path).is_file() {
                report.staged_removed.insert(path.clone());
            } else if recorded.contains_key(path) || classification.renames.values().any(|n| n == path) {
                report.staged_modified.insert(path.clone());
            } else {
                report.staged_new.insert(path.clone());
            }
        }

        report.modified = classification
            .modified
            .into_iter()
            .filter(|p| !self.state.is_staged(p))
            .collect();
        report.removed = classification
            .removed
            .into_iter()
            .filter(|p| !self.state.is_staged(p))
            .collect();

        Ok(report)
    }

    /// Switch the working tree to `revision`
    ///
    /// Refused without touching anything if files are staged or modified.
    /// When `revision` names a branch, that branch becomes current and the
    /// session is attached; otherwise the head is detached.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the revision cannot be resolved
    /// - [`StrataError::Io`] if a target file collides with an untracked file
    #[instrument(skip(self))]
    pub fn checkout(&mut self, revision: &str) -> Result<CheckoutOutcome> {
        self.require_initialized()?;
        let head = self.require_head()?;
        let target = self.resolve_revision(revision)?;

        let classification = self.classify_head(&head)?;
        if !self.state.staged.is_empty() || !classification.modified.is_empty() {
            debug!("Checkout refused: local changes present");
            return Ok(CheckoutOutcome::Refused {
                staged: self.state.staged.iter().cloned().collect(),
                modified: classification.modified.into_iter().collect(),
            });
        }

        let (files_written, files_deleted) = self.switch_tree(&head, &target)?;

        self.head = Some(Arc::clone(&target));
        if self.state.branches.contains(revision) {
            self.state.branches.set_current(revision);
        }
        self.persist()?;

        let branch = match self.head_state() {
            HeadState::Attached(name) => Some(name),
            _ => None,
        };
        info!(
            "Checked out {} ({} written, {} deleted)",
            target.short_id(),
            files_written,
            files_deleted
        );
        Ok(CheckoutOutcome::Completed(RestoreSummary {
            commit_id: target.id.clone(),
            files_written,
            files_deleted,
            branch,
        }))
    }

    /// Rewrite files that differ between `from` and `to`
    fn switch_tree(&self, from: &Commit, to: &Commit) -> Result<(usize, usize)> {
        let current = self.graph.all_files(from)?;
        let target = self.graph.all_files(to)?;
        let mut written = 0;
        let mut deleted = 0;

        for (path, blob) in &current {
            if target.get(path) != Some(blob) && self.delete_live(path)? {
                deleted += 1;
            }
        }

        for (path, blob) in &target {
            if current.get(path) != Some(blob) {
                self.storage.materialize(blob, &self.root_path.join(path))?;
                written += 1;
            }
        }

        debug!("Switched tree: {} written, {} deleted", written, deleted);
        Ok((written, deleted))
    }

    /// Restore paths to their last committed content
    ///
    /// Staged paths are skipped and reported. Paths tracked at head are
    /// rewritten from storage, discarding local edits.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if a path is not tracked at head
    #[instrument(skip(self, paths))]
    pub fn checkout_reset_changes<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<DiscardOutcome> {
        self.require_initialized()?;
        let head = self.require_head()?;
        let logical = self.logical_paths(paths)?;
        let tracked = self.graph.all_files(&head)?;

        for path in &logical {
            if !tracked.contains_key(path) && !self.state.is_staged(path) {
                return Err(StrataError::not_found(format!(
                    "{} is not tracked",
                    path.display()
                )));
            }
        }

        let mut outcome = DiscardOutcome::default();
        for path in logical {
            if self.state.is_staged(&path) {
                outcome.skipped.push(path);
                continue;
            }
            let blob = self.graph.last_version(&head, &path)?;
            self.delete_live(&path)?;
            if self.storage.blob_exists(&blob) {
                self.storage.materialize(&blob, &self.root_path.join(&path))?;
            }
            trace!("Discarded changes to {:?}", path);
            outcome.restored.push(path);
        }

        info!(
            "Restored {} path(s), skipped {}",
            outcome.restored.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    /// Move the current branch to `revision` and rewrite the working tree
    ///
    /// Local edits to tracked files are overwritten and the staged set is
    /// cleared. The session ends up attached to the current branch.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the revision cannot be resolved
    #[instrument(skip(self))]
    pub fn reset(&mut self, revision: &str) -> Result<RestoreSummary> {
        self.require_initialized()?;
        let head = self.require_head()?;
        let target = self.resolve_revision(revision)?;

        let current = self.graph.all_files(&head)?;
        let wanted = self.graph.all_files(&target)?;
        let mut files_written = 0;
        let mut files_deleted = 0;

        for path in current.keys() {
            if !wanted.contains_key(path) && self.delete_live(path)? {
                files_deleted += 1;
            }
        }

        for (path, blob) in &wanted {
            let live = self.root_path.join(path);
            if current.get(path) == Some(blob)
                && live.is_file()
                && self.storage.fingerprint(&live)? == self.storage.fingerprint_blob(blob)?
            {
                continue;
            }
            if current.contains_key(path) {
                self.delete_live(path)?;
            }
            self.storage.materialize(blob, &live)?;
            files_written += 1;
        }

        let branch = self.state.branches.current().to_string();
        self.state.branches.set(&branch, &target.id);
        self.state.clear_staged();
        self.head = Some(Arc::clone(&target));
        self.persist()?;

        info!("Reset {} to {}", branch, target.short_id());
        Ok(RestoreSummary {
            commit_id: target.id.clone(),
            files_written,
            files_deleted,
            branch: Some(branch),
        })
    }

    /// Merge `branch` into the current branch and commit the result
    ///
    /// Paths only the other branch has are copied in. Paths both sides have
    /// with different content get the other branch's bytes appended to the
    /// local file. Everything touched is staged and committed as
    /// `Merge <current> with <branch>`.
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the head is detached
    /// - [`StrataError::NotFound`] if the branch does not exist
    #[instrument(skip(self))]
    pub fn merge(&mut self, branch: &str) -> Result<MergeOutcome> {
        self.require_attached()?;
        let head = self.require_head()?;
        let target_id = self
            .state
            .branches
            .get(branch)
            .ok_or_else(|| StrataError::not_found(format!("branch {}", branch)))?
            .to_string();
        let target = self.graph.resolve(&target_id)?;

        let classification = self.classify_head(&head)?;
        if !self.state.staged.is_empty() || !classification.modified.is_empty() {
            debug!("Merge refused: local changes present");
            return Ok(MergeOutcome::Refused {
                staged: self.state.staged.iter().cloned().collect(),
                modified: classification.modified.into_iter().collect(),
            });
        }

        let ours = self.graph.all_files(&head)?;
        let theirs = self.graph.all_files(&target)?;
        let mut conflicts = Vec::new();
        let mut added = Vec::new();
        let mut touched: Vec<PathBuf> = ours
            .keys()
            .filter(|path| !theirs.contains_key(*path))
            .cloned()
            .collect();

        for (path, their_blob) in &theirs {
            let live = self.root_path.join(path);
            match ours.get(path) {
                Some(our_blob) if our_blob == their_blob => {}
                Some(our_blob) => {
                    if self.storage.fingerprint_blob(our_blob)?
                        == self.storage.fingerprint_blob(their_blob)?
                    {
                        continue;
                    }
                    let bytes = self.storage.read_blob(their_blob)?;
                    let mut file = OpenOptions::new().append(true).create(true).open(&live)?;
                    file.write_all(&bytes)?;
                    touched.push(path.clone());
                    debug!("Appended {} byte(s) from {} to {:?}", bytes.len(), branch, path);
                    conflicts.push(path.clone());
                }
                None => {
                    self.storage.materialize(their_blob, &live)?;
                    touched.push(path.clone());
                    added.push(path.clone());
                }
            }
        }

        for path in touched {
            self.state.stage(path);
        }
        let message = format!("Merge {} with {}", self.state.branches.current(), branch);
        let commit = self.commit_staged(&message)?;

        info!(
            "Merged {} into {} ({} added, {} conflicting)",
            branch,
            self.state.branches.current(),
            added.len(),
            conflicts.len()
        );
        Ok(MergeOutcome::Merged {
            commit_id: commit.id.clone(),
            conflicts,
            added,
        })
    }

    /// Create a branch at head and make it current
    ///
    /// # Errors
    ///
    /// - [`StrataError::InvalidState`] if the branch already exists
    #[instrument(skip(self))]
    pub fn branch_create(&mut self, name: &str) -> Result<()> {
        self.require_initialized()?;
        if name.trim().is_empty() {
            return Err(StrataError::invalid_state("branch name is empty"));
        }
        let head = self.require_head()?;
        self.state.branches.create(name, &head.id)?;
        self.persist()?;
        info!("Created branch {} at {}", name, head.short_id());
        Ok(())
    }

    /// Delete a branch, returning whether it existed
    ///
    /// Deleting the current branch is allowed; the current-branch name is
    /// kept and the session counts as detached until another branch is
    /// checked out.
    #[instrument(skip(self))]
    pub fn branch_remove(&mut self, name: &str) -> Result<bool> {
        self.require_initialized()?;
        let existed = self.state.branches.remove(name);
        if existed && name == self.state.branches.current() {
            warn!("Removed the current branch {}; head is now detached", name);
        }
        self.persist()?;
        Ok(existed)
    }

    /// Branch names in sorted order
    pub fn show_branches(&self) -> Result<Vec<String>> {
        self.require_initialized()?;
        Ok(self.state.branches.list())
    }

    /// History from head back to the root
    ///
    /// With a revision, the walk stops before the commit it resolves to.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the revision cannot be resolved
    #[instrument(skip(self))]
    pub fn log(&self, revision: Option<&str>) -> Result<Vec<LogEntry>> {
        self.require_initialized()?;
        let head = self.require_head()?;
        let stop = match revision {
            Some(token) => Some(self.resolve_revision(token)?.id.clone()),
            None => None,
        };

        let entries = self
            .graph
            .history(&head, stop.as_deref())?
            .into_iter()
            .map(|c| LogEntry {
                id: c.id.clone(),
                author: c.author.clone(),
                message: c.message.clone(),
                timestamp: c.timestamp,
            })
            .collect();
        Ok(entries)
    }

    /// Resolve a revision token to a commit
    ///
    /// Branch names win over head-relative tokens (`HEAD~n`, `HEAD`), which
    /// win over literal commit identifiers.
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if any resolution step fails
    pub fn resolve_revision(&self, token: &str) -> Result<Arc<Commit>> {
        self.require_initialized()?;
        let revision = Revision::parse(token, &self.config.head_prefix, |name| {
            self.state.branches.contains(name)
        })?;
        trace!("Resolving {}", revision);

        match revision {
            Revision::Branch(name) => {
                let id = self
                    .state
                    .branches
                    .get(&name)
                    .ok_or_else(|| StrataError::not_found(format!("branch {}", name)))?;
                self.graph.resolve(id)
            }
            Revision::HeadRelative(n) => {
                let head = self.require_head()?;
                self.graph.nth_ancestor(&head, n)
            }
            Revision::Commit(id) => self.graph.resolve(&id),
        }
    }

    /// Identifier of the commit `n` parents behind head
    pub fn relative_revision_from_head(&self, n: usize) -> Result<String> {
        self.require_initialized()?;
        let head = self.require_head()?;
        Ok(self.graph.nth_ancestor(&head, n)?.id.clone())
    }

    /// Every file visible at head, with the blob holding its content
    pub fn tracked_files(&self) -> Result<BTreeMap<PathBuf, BlobRef>> {
        self.require_initialized()?;
        let head = self.require_head()?;
        self.graph.all_files(&head)
    }
}

/// Builder for a [`Strata`] session
///
/// Values set here are used when the root has no repository yet and are
/// persisted by [`Strata::init`]. An existing repository keeps the
/// configuration it was created with; only the metadata directory name is
/// taken from the builder, since it is needed to find the repository.
///
/// ```rust,no_run
/// use strata::StrataBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut repo = StrataBuilder::new()
///     .default_branch("main")
///     .ignore_patterns(vec!["*.log".to_string(), "target".to_string()])
///     .open("./project")?;
/// repo.init()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StrataBuilder {
    config: StrataConfig,
}

impl StrataBuilder {
    /// Builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the branch created by `init`
    pub fn default_branch(mut self, name: impl Into<String>) -> Self {
        self.config.default_branch = name.into();
        self
    }

    /// Metadata directory name, relative to the root
    pub fn metadata_dir(mut self, name: impl Into<String>) -> Self {
        self.config.metadata_dir = name.into();
        self
    }

    /// Glob patterns excluded from scanning
    ///
    /// Patterns are matched against root-relative paths; a matching
    /// directory is skipped along with everything below it.
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }

    /// Author recorded on new commits
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.author = Some(author.into());
        self
    }

    /// Prefix of head-relative revision tokens
    pub fn head_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.head_prefix = prefix.into();
        self
    }

    /// Open a session on `root`
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if `root` is not a directory
    /// - [`StrataError::InvalidPattern`] if an ignore pattern does not compile
    /// - [`StrataError::Json`] if persisted metadata or state is unreadable
    pub fn open(self, root: impl AsRef<Path>) -> Result<Strata> {
        Strata::from_config(root.as_ref().to_path_buf(), self.config)
    }
}
