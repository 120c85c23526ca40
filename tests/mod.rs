//! Main test module for Strata
//!
//! This module includes all test suites:
//! - Integration tests for complete workflows
//! - Property-based tests for invariants
//! - Edge cases around paths, branches and corrupted metadata

pub mod integration;
pub mod property;

#[cfg(test)]
mod edge_cases {
    use ::strata::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn init_repo() -> (Strata, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut strata = Strata::open(temp_dir.path()).unwrap();
        strata.init().unwrap();
        (strata, temp_dir)
    }

    #[test]
    fn test_empty_repository() {
        let (strata, _temp_dir) = init_repo();
        let status = strata.status().unwrap();
        assert!(status.is_clean());
        assert!(strata.tracked_files().unwrap().is_empty());
        assert_eq!(strata.log(None).unwrap().len(), 1);
    }

    #[test]
    fn test_open_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = Strata::open(temp_dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_special_filenames() {
        let (mut strata, temp_dir) = init_repo();

        let special_names = vec![
            "file with spaces.txt",
            "file-with-dashes.txt",
            "file.with.dots.txt",
            "file@with#special$chars.txt",
            "file(with)parens.txt",
            "файл.txt",
            "文件.txt",
        ];

        let mut created = Vec::new();
        for name in &special_names {
            if fs::write(temp_dir.path().join(name), format!("Content of {}", name)).is_ok() {
                created.push(*name);
            }
        }
        strata.add(&created).unwrap();
        let c1 = strata.commit("special names").unwrap();

        for name in &created {
            fs::remove_file(temp_dir.path().join(name)).unwrap();
        }
        strata.add(&created).unwrap();
        strata.commit("delete all").unwrap();
        assert!(strata.tracked_files().unwrap().is_empty());

        strata.checkout(&c1.id).unwrap();
        for name in &created {
            let content = fs::read_to_string(temp_dir.path().join(name)).unwrap();
            assert_eq!(content, format!("Content of {}", name));
        }
    }

    #[test]
    fn test_metadata_paths_rejected() {
        let (mut strata, temp_dir) = init_repo();
        let err = strata.add(&[".strata/state.json"]).unwrap_err();
        assert!(matches!(err, StrataError::NotFound(_)));

        let outside = temp_dir.path().parent().unwrap().join("elsewhere.txt");
        let err = strata.add(&[outside]).unwrap_err();
        assert!(matches!(err, StrataError::NotFound(_)));
    }

    #[test]
    fn test_absolute_paths_inside_root() {
        let (mut strata, temp_dir) = init_repo();
        let file = temp_dir.path().join("abs.txt");
        fs::write(&file, "abs").unwrap();

        let staged = strata.add(&[file]).unwrap();
        assert_eq!(staged, vec![PathBuf::from("abs.txt")]);
    }

    #[test]
    fn test_nested_directories_pruned_on_checkout() {
        let (mut strata, temp_dir) = init_repo();
        let root = temp_dir.path();
        let base = strata.log(None).unwrap()[0].id.clone();

        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("a/b/c/deep.txt"), "deep").unwrap();
        strata.add(&["a/b/c/deep.txt"]).unwrap();
        strata.commit("deep").unwrap();

        strata.checkout(&base).unwrap();
        assert!(!root.join("a").exists());
        strata.checkout("master").unwrap();
        assert_eq!(fs::read_to_string(root.join("a/b/c/deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn test_checkout_collision_with_untracked_file() {
        let (mut strata, temp_dir) = init_repo();
        let root = temp_dir.path();

        strata.branch_create("feature").unwrap();
        fs::write(root.join("clash.txt"), "tracked").unwrap();
        strata.add(&["clash.txt"]).unwrap();
        strata.commit("add clash").unwrap();

        strata.checkout("master").unwrap();
        assert!(!root.join("clash.txt").exists());
        fs::write(root.join("clash.txt"), "untracked").unwrap();

        let err = strata.checkout("feature").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_eq!(fs::read_to_string(root.join("clash.txt")).unwrap(), "untracked");
    }

    #[test]
    fn test_rename_is_committed_as_move() {
        let (mut strata, temp_dir) = init_repo();
        let root = temp_dir.path();
        fs::write(root.join("old.txt"), "moving content").unwrap();
        strata.add(&["old.txt"]).unwrap();
        strata.commit("add old").unwrap();

        fs::rename(root.join("old.txt"), root.join("new.txt")).unwrap();
        let status = strata.status().unwrap();
        assert!(status.modified.contains(Path::new("new.txt")));
        assert!(status.removed.is_empty());

        strata.add(&["new.txt"]).unwrap();
        strata.commit("move").unwrap();

        let tracked = strata.tracked_files().unwrap();
        assert_eq!(tracked.keys().collect::<Vec<_>>(), vec![Path::new("new.txt")]);
        assert!(strata.status().unwrap().is_clean());
    }

    #[test]
    fn test_ignore_patterns_persist() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut strata = StrataBuilder::new()
            .ignore_patterns(vec!["*.log".to_string(), "build".to_string()])
            .open(root)
            .unwrap();
        strata.init().unwrap();

        fs::write(root.join("app.log"), "noise").unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("build/out.bin"), "bin").unwrap();
        fs::write(root.join("main.txt"), "main").unwrap();

        // A plain reopen picks up the persisted patterns
        let strata = Strata::open(root).unwrap();
        let status = strata.status().unwrap();
        assert_eq!(
            status.untracked.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("main.txt")]
        );
    }

    #[test]
    fn test_custom_default_branch() {
        let temp_dir = TempDir::new().unwrap();
        let mut strata = StrataBuilder::new()
            .default_branch("main")
            .open(temp_dir.path())
            .unwrap();
        strata.init().unwrap();
        assert_eq!(strata.show_branches().unwrap(), vec!["main".to_string()]);
        assert_eq!(strata.status().unwrap().branch, "main");
    }

    #[test]
    fn test_corrupt_state_file_is_reported() {
        let (_strata, temp_dir) = init_repo();
        fs::write(temp_dir.path().join(".strata/state.json"), "{ broken").unwrap();
        let err = Strata::open(temp_dir.path()).unwrap_err();
        assert!(err.is_corruption());
    }
}
