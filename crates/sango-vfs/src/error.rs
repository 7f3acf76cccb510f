//! Error types for the drive tree and query engine.

use thiserror::Error;

/// Error from a drive's directory-read capability.
///
/// Inside path expansion these are recovered per branch — a failed read
/// contributes zero children and never aborts the query.
#[derive(Debug, Clone, Error)]
pub enum DriveError {
    /// Path does not exist on the drive.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Anything else the backing store reports.
    #[error("{0}")]
    Other(String),
}

impl DriveError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Error resolving a human-readable drive reference.
#[derive(Debug, Clone, Error)]
#[error("unresolvable drive reference: {0}")]
pub struct ResolveError(pub String);

/// Terminal outcome of a query call.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed options; reported before any directory read.
    #[error("the `{0}` parameter is invalid")]
    InvalidArgument(&'static str),

    /// The `mount` filter reference could not be resolved to a key.
    #[error(transparent)]
    Unresolvable(#[from] ResolveError),

    /// The query was cancelled; no partial results are returned.
    #[error("query cancelled")]
    Cancelled,
}

/// Result type for drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Result type for query calls.
pub type QueryResult<T> = Result<T, QueryError>;
