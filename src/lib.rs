//! # Strata - local versioned storage with branches
//!
//! A single-repository version-control engine: it records file snapshots as
//! commits, keeps named branches, diffs the live working tree against the
//! last commit, and rewrites files when switching commits or merging
//! branches.
//!
//! ## Overview
//!
//! Strata tracks one working directory. Repository data lives in a metadata
//! directory (`.strata` by default) inside it:
//!
//! - commits are immutable records that store only the paths they changed,
//!   plus an inherited index pointing every other path at the ancestor that
//!   last changed it
//! - file versions are stored as blobs; a blob reference whose object was
//!   never written is a tombstone marking a deleted path
//! - the state record holds the staged set, the branch table, the current
//!   branch and the head commit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata::{CheckoutOutcome, Strata};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut repo = Strata::open("./my_project")?;
//! repo.init()?;
//!
//! std::fs::write("./my_project/a.txt", "x")?;
//! repo.add(&["a.txt"])?;
//! repo.commit("c1")?;
//!
//! repo.branch_create("feature")?;
//! repo.checkout("master")?;
//!
//! for entry in repo.log(None)? {
//!     print!("{}", entry);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Attached and detached heads
//!
//! The session is attached when its head is the commit the current branch
//! records. Checking out anything that is not a branch detaches it, and
//! writes (`add`, `remove`, `commit`, `status`, `merge`) are refused until a
//! branch is checked out again.
//!
//! ### Revisions
//!
//! Operations that take a revision accept a branch name, `HEAD~n` (`n`
//! parents behind head), `HEAD`, or a literal commit identifier, tried in
//! that order.
//!
//! ### Merging
//!
//! Merge is textual: a path both branches changed gets the other branch's
//! bytes appended to the local file. The result is committed immediately
//! with a single parent.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, StrataError>`. [`StrataError::kind`]
//! maps every error onto four categories: not found, invalid state, I/O
//! failure and structure corruption.
//!
//! ## Module Organization
//!
//! - [`strata`]: the session and its builder
//! - [`commit`]: commit records and the inherited index
//! - [`graph`]: commit creation and file-set resolution
//! - [`branch`]: the branch table
//! - [`scanner`]: working-tree classification
//! - [`revision`]: revision tokens
//! - [`types`]: configuration and operation outcomes
//! - [`error`]: error types

pub mod branch;
pub mod commit;
pub mod error;
pub mod graph;
pub mod revision;
pub mod scanner;
pub mod state;
pub mod storage;
pub mod strata;
pub mod types;

// Internal modules (not part of public API)
mod utils;

// Re-export main types for convenience
pub use branch::BranchTable;
pub use commit::Commit;
pub use error::{ErrorKind, Result, StrataError};
pub use graph::CommitGraph;
pub use revision::Revision;
pub use scanner::WorkingTreeScanner;
pub use state::RepoState;
pub use storage::Storage;
pub use strata::{Strata, StrataBuilder};
pub use types::*;
