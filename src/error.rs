//! Error types for the Strata library
//!
//! Every fallible operation returns [`StrataError`]. The enum carries enough
//! detail for a useful message, while [`StrataError::kind`] collapses it onto
//! the four categories callers actually branch on: a missing commit, branch or
//! path ([`ErrorKind::NotFound`]), an operation refused in the current
//! repository state ([`ErrorKind::InvalidState`]), an underlying storage
//! failure ([`ErrorKind::IoFailure`]) and a broken commit structure
//! ([`ErrorKind::StructureCorruption`]).

use thiserror::Error;

/// Type alias for Results in the Strata library
pub type Result<T> = std::result::Result<T, StrataError>;

/// Main error type for all Strata operations
#[derive(Debug, Error)]
pub enum StrataError {
    /// A commit, branch or path argument could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not allowed in the current repository state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A commit's ancestor index cannot resolve a path it claims to own
    #[error("Repository structure is broken: {0}")]
    StructureCorruption(String),

    /// Errors during JSON serialization/deserialization of persisted records
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Ignore pattern could not be compiled
    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),
}

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing commit, branch, or path argument
    NotFound,
    /// Write attempted while detached, branch collision, re-init
    InvalidState,
    /// Underlying storage read/write error
    IoFailure,
    /// Commit structure cannot be resolved
    StructureCorruption,
}

impl StrataError {
    /// Create a not-found error with a custom message
    pub fn not_found(msg: impl Into<String>) -> Self {
        StrataError::NotFound(msg.into())
    }

    /// Create an invalid-state error with a custom message
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        StrataError::InvalidState(msg.into())
    }

    /// Create a structure corruption error with a custom message
    pub fn corruption(msg: impl Into<String>) -> Self {
        StrataError::StructureCorruption(msg.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StrataError::NotFound(_) => ErrorKind::NotFound,
            StrataError::InvalidState(_) | StrataError::InvalidPattern(_) => ErrorKind::InvalidState,
            StrataError::Io(_) | StrataError::WalkDir(_) => ErrorKind::IoFailure,
            StrataError::StructureCorruption(_) | StrataError::Json(_) => {
                ErrorKind::StructureCorruption
            }
        }
    }

    /// Check if this error indicates a broken repository
    pub fn is_corruption(&self) -> bool {
        self.kind() == ErrorKind::StructureCorruption
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            StrataError::InvalidState(msg) if msg.contains("detached") => {
                format!("{}. Check out a branch before making changes.", msg)
            }
            StrataError::InvalidState(msg) if msg.contains("not initialized") => {
                format!("{}. Run 'strata init' first.", msg)
            }
            StrataError::NotFound(msg) => {
                format!("{}. Use 'strata status' or 'strata show-branches' to see what exists.", msg)
            }
            StrataError::StructureCorruption(msg) => {
                format!("Repository structure is broken ({}). The metadata directory may have been edited by hand.", msg)
            }
            _ => self.to_string(),
        }
    }
}
