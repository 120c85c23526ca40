//! Revision tokens
//!
//! A revision token names a commit in one of three ways, tried in order:
//!
//! 1. the name of an existing branch
//! 2. the head-relative prefix followed by a parent count (`HEAD~2`), or the
//!    bare prefix stem (`HEAD`) for head itself
//! 3. a literal commit identifier
//!
//! Parsing is purely lexical; whether a branch exists is decided by the
//! caller, which is why [`Revision::parse`] takes a branch lookup.

use crate::error::{Result, StrataError};
use std::fmt;

/// Parsed revision token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Existing branch name
    Branch(String),
    /// Number of parent links to walk back from head
    HeadRelative(usize),
    /// Literal commit identifier
    Commit(String),
}

impl Revision {
    /// Parse `token` using `prefix` for head-relative forms
    ///
    /// # Errors
    ///
    /// - [`StrataError::NotFound`] if the token is empty, or carries the
    ///   head-relative prefix with something other than a non-negative integer
    pub fn parse(token: &str, prefix: &str, is_branch: impl Fn(&str) -> bool) -> Result<Self> {
        if token.is_empty() {
            return Err(StrataError::not_found("empty revision"));
        }
        if is_branch(token) {
            return Ok(Revision::Branch(token.to_string()));
        }

        if let Some(count) = token.strip_prefix(prefix) {
            return count
                .parse::<usize>()
                .map(Revision::HeadRelative)
                .map_err(|_| StrataError::not_found(format!("revision {}", token)));
        }

        let stem = prefix.trim_end_matches(|c: char| !c.is_alphanumeric());
        if !stem.is_empty() && token == stem {
            return Ok(Revision::HeadRelative(0));
        }

        Ok(Revision::Commit(token.to_string()))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Branch(name) => write!(f, "branch {}", name),
            Revision::HeadRelative(0) => write!(f, "head"),
            Revision::HeadRelative(n) => write!(f, "{} commit(s) before head", n),
            Revision::Commit(id) => write!(f, "commit {}", id),
        }
    }
}
