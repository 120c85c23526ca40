//! Integration tests for Strata
//!
//! Drives complete workflows through the public API: committing generated
//! projects, switching branches, resetting, and merging.

use ::strata::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Live file contents keyed by root-relative path
pub type TreeSnapshot = BTreeMap<PathBuf, Vec<u8>>;

/// Test harness wrapping a repository in a temporary directory
pub struct StrataTestHarness {
    pub temp_dir: TempDir,
    pub strata: Strata,
    pub file_generator: FileGenerator,
}

impl StrataTestHarness {
    /// Create an initialized repository
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut strata = StrataBuilder::new()
            .author("harness")
            .open(temp_dir.path())
            .unwrap();
        strata.init().unwrap();

        Self {
            temp_dir,
            strata,
            file_generator: FileGenerator::new(42),
        }
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file, creating parent directories
    pub fn write(&self, path: &str, content: impl AsRef<[u8]>) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    /// Read a file as a string
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path)).unwrap()
    }

    /// Generate a project of `dirs` directories with `files_per_dir` files each
    pub fn generate_project(&mut self, dirs: usize, files_per_dir: usize) -> anyhow::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for d in 0..dirs {
            let dir = self.root().join(format!("dir_{}", d));
            fs::create_dir_all(&dir)?;
            for f in 0..files_per_dir {
                let relative = PathBuf::from(format!("dir_{}/file_{}.txt", d, f));
                let content = self.file_generator.generate_file_content(16..512);
                fs::write(self.root().join(&relative), content)?;
                paths.push(relative);
            }
        }
        Ok(paths)
    }

    /// Rewrite `count` of the given files with fresh content
    pub fn mutate_files(&mut self, paths: &[PathBuf], count: usize) -> anyhow::Result<Vec<PathBuf>> {
        let mut changed = Vec::new();
        for _ in 0..count {
            let idx = self.file_generator.rng.random_range(0..paths.len());
            let content = self.file_generator.generate_file_content(16..512);
            fs::write(self.root().join(&paths[idx]), content)?;
            changed.push(paths[idx].clone());
        }
        Ok(changed)
    }

    /// Stage every pending change and commit it
    pub fn commit_all(&mut self, message: &str) -> Result<Commit> {
        let status = self.strata.status()?;
        let pending: Vec<PathBuf> = status
            .untracked
            .iter()
            .chain(status.modified.iter())
            .chain(status.removed.iter())
            .cloned()
            .collect();
        if !pending.is_empty() {
            self.strata.add(&pending)?;
        }
        let commit = self.strata.commit(message)?;
        info!("Committed {} ({} pending path(s))", commit.short_id(), pending.len());
        Ok((*commit).clone())
    }

    /// Current live tree, excluding the metadata directory
    pub fn snapshot(&self) -> TreeSnapshot {
        snapshot_tree(self.root())
    }
}

impl Default for StrataTestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Read every regular file under `root` except the metadata directory
pub fn snapshot_tree(root: &Path) -> TreeSnapshot {
    let mut snapshot = TreeSnapshot::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != DEFAULT_METADATA_DIR)
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            snapshot.insert(relative, fs::read(entry.path()).unwrap());
        }
    }
    snapshot
}

/// Seeded content generator
pub struct FileGenerator {
    pub rng: StdRng,
}

impl FileGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random printable content with a length in `size_range`
    pub fn generate_file_content(&mut self, size_range: std::ops::Range<usize>) -> Vec<u8> {
        let len = self.rng.random_range(size_range);
        (0..len)
            .map(|_| {
                let c = self.rng.random_range(0..64u8);
                match c {
                    0..=25 => b'a' + c,
                    26..=51 => b'A' + (c - 26),
                    52..=61 => b'0' + (c - 52),
                    62 => b' ',
                    _ => b'\n',
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_end_to_end_branch_scenario() {
        let mut harness = StrataTestHarness::new();

        harness.write("A", "x");
        harness.strata.add(&["A"]).unwrap();
        harness.strata.commit("c1").unwrap();
        harness.strata.branch_create("b").unwrap();
        assert!(harness.strata.show_branches().unwrap().contains(&"b".to_string()));

        harness.strata.checkout("master").unwrap();
        harness.write("A", "y");
        harness.commit_all("c2").unwrap();

        harness.strata.checkout("b").unwrap();
        assert_eq!(harness.read("A"), "x");
        assert!(logs_contain("Committed"));
    }

    #[test]
    fn test_status_clean_after_commit() {
        let mut harness = StrataTestHarness::new();
        let paths = harness.generate_project(3, 5).unwrap();

        let status = harness.strata.status().unwrap();
        assert_eq!(status.untracked.len(), paths.len());

        harness.strata.add(&paths).unwrap();
        harness.strata.commit("project").unwrap();

        let status = harness.strata.status().unwrap();
        assert!(status.is_clean(), "status after commit: {}", status);
        for path in &paths {
            assert!(!status.untracked.contains(path));
            assert!(!status.modified.contains(path));
            assert!(!harness.strata.staged().contains(path));
        }
    }

    #[test]
    fn test_log_is_reverse_chronological() {
        let mut harness = StrataTestHarness::new();
        let paths = harness.generate_project(2, 3).unwrap();
        harness.commit_all("c0").unwrap();

        for i in 1..=5 {
            harness.mutate_files(&paths, 2).unwrap();
            harness.commit_all(&format!("c{}", i)).unwrap();

            let log = harness.strata.log(None).unwrap();
            assert_eq!(log[0].message, format!("c{}", i));
        }

        let messages: Vec<_> = harness
            .strata
            .log(None)
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["c5", "c4", "c3", "c2", "c1", "c0", "Initial commit"]);
    }

    #[test]
    fn test_checkout_current_branch_is_idempotent() {
        let mut harness = StrataTestHarness::new();
        harness.generate_project(2, 4).unwrap();
        harness.commit_all("project").unwrap();
        let before = harness.snapshot();

        match harness.strata.checkout("master").unwrap() {
            CheckoutOutcome::Completed(summary) => {
                assert_eq!(summary.files_written, 0);
                assert_eq!(summary.files_deleted, 0);
                assert_eq!(summary.branch.as_deref(), Some("master"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(harness.snapshot(), before);
        assert!(harness.strata.status().unwrap().is_clean());
    }

    #[test]
    fn test_reset_matches_checkout() {
        let mut harness = StrataTestHarness::new();
        let paths = harness.generate_project(2, 4).unwrap();
        harness.commit_all("c1").unwrap();
        let target = harness.strata.head().unwrap().id.clone();

        harness.mutate_files(&paths, 4).unwrap();
        harness.write("extra/new.txt", "new");
        fs::remove_file(harness.root().join(&paths[0])).unwrap();
        harness.commit_all("c2").unwrap();
        harness.mutate_files(&paths[1..], 2).unwrap();
        harness.commit_all("c3").unwrap();

        harness.strata.checkout(&target).unwrap();
        let via_checkout = harness.snapshot();
        harness.strata.checkout("master").unwrap();

        // Local edits are discarded by reset
        harness.write(paths[1].to_str().unwrap(), "local edit");
        let summary = harness.strata.reset(&target).unwrap();
        assert_eq!(summary.commit_id, target);

        assert_eq!(harness.snapshot(), via_checkout);
        assert!(!harness.root().join("extra").exists());
        assert!(harness.strata.status().unwrap().is_clean());
        assert_eq!(harness.strata.log(None).unwrap()[0].message, "c1");
    }

    #[test]
    fn test_merge_disjoint_branches() {
        let mut harness = StrataTestHarness::new();
        harness.write("common.txt", "common");
        harness.commit_all("base").unwrap();

        harness.strata.branch_create("feature").unwrap();
        harness.write("feature/only.txt", "feature");
        harness.commit_all("feature work").unwrap();
        let feature_files = harness.strata.tracked_files().unwrap();

        harness.strata.checkout("master").unwrap();
        harness.write("master/only.txt", "master");
        harness.commit_all("master work").unwrap();
        let master_files = harness.strata.tracked_files().unwrap();
        let head_before = harness.strata.head().unwrap().id.clone();

        let outcome = harness.strata.merge("feature").unwrap();
        let MergeOutcome::Merged { conflicts, added, .. } = outcome else {
            panic!("merge was refused");
        };
        assert!(conflicts.is_empty());
        assert_eq!(added, vec![PathBuf::from("feature/only.txt")]);

        let merged = harness.strata.tracked_files().unwrap();
        let mut expected: Vec<_> = feature_files.keys().chain(master_files.keys()).cloned().collect();
        expected.sort();
        expected.dedup();
        assert_eq!(merged.keys().cloned().collect::<Vec<_>>(), expected);

        let log = harness.strata.log(None).unwrap();
        assert_eq!(log[0].message, "Merge master with feature");
        assert_eq!(log[1].id, head_before);
        assert_eq!(harness.read("feature/only.txt"), "feature");
        assert_eq!(harness.read("master/only.txt"), "master");
    }

    #[test]
    fn test_merge_colliding_path() {
        let mut harness = StrataTestHarness::new();
        harness.write("notes.txt", "base\n");
        harness.commit_all("base").unwrap();

        harness.strata.branch_create("other").unwrap();
        harness.write("notes.txt", "foreign\n");
        harness.commit_all("other edit").unwrap();

        harness.strata.checkout("master").unwrap();
        harness.write("notes.txt", "local\n");
        harness.commit_all("local edit").unwrap();

        let outcome = harness.strata.merge("other").unwrap();
        assert!(outcome.to_string().contains("Fix notes.txt"));
        assert_eq!(harness.read("notes.txt"), "local\nforeign\n");

        // The concatenation is committed
        assert!(harness.strata.status().unwrap().is_clean());
        let head = harness.strata.head().unwrap().clone();
        assert!(head.files.contains_key(Path::new("notes.txt")));
    }

    #[test]
    fn test_merge_refused_with_local_changes() {
        let mut harness = StrataTestHarness::new();
        harness.write("a.txt", "a");
        harness.commit_all("base").unwrap();
        harness.strata.branch_create("other").unwrap();
        harness.strata.checkout("master").unwrap();

        harness.write("a.txt", "dirty");
        let outcome = harness.strata.merge("other").unwrap();
        assert_eq!(outcome.to_string(), "Stash your changes");
        assert_eq!(harness.strata.log(None).unwrap()[0].message, "base");
    }

    #[test]
    fn test_branch_create_and_show() {
        let mut harness = StrataTestHarness::new();
        harness.strata.branch_create("topic").unwrap();
        assert!(harness.strata.show_branches().unwrap().contains(&"topic".to_string()));

        let err = harness.strata.branch_create("topic").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = harness.strata.branch_create("master").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_history_navigation_restores_snapshots() {
        let mut harness = StrataTestHarness::new();
        let paths = harness.generate_project(3, 3).unwrap();

        let mut snapshots = Vec::new();
        for i in 0..6 {
            if i > 0 {
                harness.mutate_files(&paths, 3).unwrap();
            }
            let commit = harness.commit_all(&format!("step {}", i)).unwrap();
            snapshots.push((commit.id, harness.snapshot()));
        }

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let (id, expected) = &snapshots[rng.random_range(0..snapshots.len())];
            harness.strata.checkout(id).unwrap();
            assert_eq!(&harness.snapshot(), expected);
        }

        harness.strata.checkout("master").unwrap();
        assert_eq!(harness.snapshot(), snapshots.last().unwrap().1);
    }

    #[test]
    fn test_removed_branch_leaves_session_detached() {
        let mut harness = StrataTestHarness::new();
        harness.strata.branch_create("temp").unwrap();
        assert!(harness.strata.branch_remove("temp").unwrap());

        assert_eq!(harness.strata.current_branch(), "temp");
        assert!(matches!(harness.strata.head_state(), HeadState::Detached(_)));
        assert_eq!(harness.strata.status().unwrap_err().kind(), ErrorKind::InvalidState);

        harness.strata.checkout("master").unwrap();
        assert_eq!(harness.strata.head_state(), HeadState::Attached("master".to_string()));
    }
}
