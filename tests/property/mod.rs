//! Property-based testing for Strata
//!
//! Uses proptest to check invariants across randomly generated working
//! trees and edit sequences.

use ::strata::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Edit applied to the working tree between commits
#[derive(Debug, Clone)]
pub enum FileOperation {
    Create { path: PathBuf, content: Vec<u8> },
    Modify { path: PathBuf, content: Vec<u8> },
    Delete { path: PathBuf },
}

fn file_operation_strategy() -> impl Strategy<Value = FileOperation> {
    prop_oneof![
        (path_strategy(), content_strategy())
            .prop_map(|(path, content)| FileOperation::Create { path, content }),
        (path_strategy(), content_strategy())
            .prop_map(|(path, content)| FileOperation::Modify { path, content }),
        path_strategy().prop_map(|path| FileOperation::Delete { path }),
    ]
}

/// Directory names never contain a dot and file names always do, so a
/// generated file path can never collide with a generated directory
fn path_strategy() -> impl Strategy<Value = PathBuf> {
    let dir_strategy = prop::collection::vec("[a-d]{1,2}", 0..=2);
    let filename_strategy = "f[0-9]{1,2}\\.(txt|rs|md)";

    (dir_strategy, filename_strategy).prop_map(|(dirs, filename)| {
        let mut path = PathBuf::new();
        for dir in dirs {
            path.push(dir);
        }
        path.join(filename)
    })
}

fn content_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        "[a-zA-Z0-9 \n]{1,200}".prop_map(|s| s.into_bytes()),
        prop::collection::vec(any::<u8>(), 1..512),
    ]
}

fn apply_operation(root: &Path, op: &FileOperation) -> anyhow::Result<()> {
    match op {
        FileOperation::Create { path, content } => {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full_path, content)?;
        }
        FileOperation::Modify { path, content } => {
            let full_path = root.join(path);
            if full_path.exists() {
                fs::write(full_path, content)?;
            }
        }
        FileOperation::Delete { path } => {
            let full_path = root.join(path);
            if full_path.exists() {
                fs::remove_file(full_path)?;
            }
        }
    }
    Ok(())
}

/// Live tree contents, excluding the metadata directory
fn tree_contents(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut contents = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != DEFAULT_METADATA_DIR)
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            contents.insert(relative, fs::read(entry.path()).unwrap());
        }
    }
    contents
}

/// Stage everything pending and commit
fn commit_everything(strata: &mut Strata, message: &str) -> Result<String> {
    let status = strata.status()?;
    let pending: Vec<PathBuf> = status
        .untracked
        .into_iter()
        .chain(status.modified)
        .chain(status.removed)
        .collect();
    if !pending.is_empty() {
        strata.add(&pending)?;
    }
    Ok(strata.commit(message)?.id.clone())
}

fn new_repo() -> (Strata, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut strata = Strata::open(temp_dir.path()).unwrap();
    strata.init().unwrap();
    (strata, temp_dir)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Committing everything leaves a clean tree whose tracked set equals the live set
    #[test]
    fn commit_all_leaves_clean_status(
        operations in prop::collection::vec(file_operation_strategy(), 1..40)
    ) {
        let (mut strata, temp_dir) = new_repo();
        for op in &operations {
            apply_operation(temp_dir.path(), op).unwrap();
        }

        commit_everything(&mut strata, "snapshot").unwrap();

        let status = strata.status().unwrap();
        prop_assert!(status.is_clean(), "status: {}", status);

        let live = tree_contents(temp_dir.path());
        let tracked: Vec<_> = strata.tracked_files().unwrap().into_keys().collect();
        prop_assert_eq!(tracked, live.keys().cloned().collect::<Vec<_>>());
    }

    /// Every commit in a history can be checked out byte for byte
    #[test]
    fn checkout_restores_each_commit(
        operation_sets in prop::collection::vec(
            prop::collection::vec(file_operation_strategy(), 1..12),
            2..6
        )
    ) {
        let (mut strata, temp_dir) = new_repo();
        let mut expected = Vec::new();

        for (idx, operations) in operation_sets.iter().enumerate() {
            for op in operations {
                apply_operation(temp_dir.path(), op).unwrap();
            }
            let id = commit_everything(&mut strata, &format!("commit {}", idx)).unwrap();
            expected.push((id, tree_contents(temp_dir.path())));
        }

        for (id, contents) in &expected {
            let outcome = strata.checkout(id).unwrap();
            prop_assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
            prop_assert_eq!(&tree_contents(temp_dir.path()), contents);
        }
    }

    /// Log lists messages newest first, one per commit
    #[test]
    fn log_is_newest_first(messages in prop::collection::vec("[a-z]{1,12}", 1..8)) {
        let (mut strata, temp_dir) = new_repo();

        for (i, message) in messages.iter().enumerate() {
            fs::write(temp_dir.path().join("counter.txt"), i.to_string()).unwrap();
            commit_everything(&mut strata, message).unwrap();
        }

        let logged: Vec<String> = strata.log(None).unwrap().into_iter().map(|e| e.message).collect();
        let mut expected: Vec<String> = messages.iter().rev().cloned().collect();
        expected.push("Initial commit".to_string());
        prop_assert_eq!(logged, expected);
    }

    /// Head-relative tokens parse to their parent count
    #[test]
    fn head_relative_tokens_parse(n in 0usize..10_000) {
        let token = format!("HEAD~{}", n);
        let revision = Revision::parse(&token, DEFAULT_HEAD_PREFIX, |_| false).unwrap();
        prop_assert_eq!(revision, Revision::HeadRelative(n));
    }

    /// Any token naming a branch resolves as that branch
    #[test]
    fn branch_names_win(name in "[a-zA-Z~0-9]{1,12}") {
        let revision = Revision::parse(&name, DEFAULT_HEAD_PREFIX, |_| true).unwrap();
        prop_assert_eq!(revision, Revision::Branch(name));
    }
}
