//! Database Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A database error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    /// Table prefixes end up in SQL verbatim, so only identifier characters
    /// are accepted.
    #[display("invalid table prefix: {_0:?}")]
    InvalidTablePrefix(#[error(not(source))] String),
    #[display("unknown post type: {_0:?} (expected \"post\" or \"page\")")]
    UnknownPostType(#[error(not(source))] String),
    /// An UPDATE by primary key didn't touch exactly one row.
    #[display("updating post {id} affected {affected} rows")]
    UnexpectedRowCount { id: i64, affected: u64 },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
