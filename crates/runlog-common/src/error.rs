//! Error types for the runlog store.

use thiserror::Error;

/// Result type alias for runlog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for runlog operations.
///
/// Validation errors and `RunNotFound` are kept distinct so callers can
/// render "bad request" versus "nothing recorded yet" differently.
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (10-19)
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid name: {name}")]
    InvalidName { name: String },

    #[error("target already exists: {name}")]
    TargetExists { name: String },

    #[error("source run missing: {name}")]
    SourceMissing { name: String },

    #[error("category not found: {name}")]
    CategoryNotFound { name: String },

    // Not-found errors (20-29)
    #[error("run not found: {category}/{run}")]
    RunNotFound { category: String, run: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rename failed: {from} -> {to}")]
    RenameFailed { from: String, to: String },
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingInput(_) => 10,
            Error::InvalidName { .. } => 11,
            Error::TargetExists { .. } => 12,
            Error::SourceMissing { .. } => 13,
            Error::CategoryNotFound { .. } => 14,
            Error::RunNotFound { .. } => 20,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::RenameFailed { .. } => 62,
        }
    }

    /// True when the error means "nothing recorded yet" rather than a bad
    /// request or an I/O fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RunNotFound { .. })
    }

    /// True for caller-input problems that never touch on-disk state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingInput(_)
                | Error::InvalidName { .. }
                | Error::TargetExists { .. }
                | Error::SourceMissing { .. }
                | Error::CategoryNotFound { .. }
        )
    }
}
