//! Crop Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Parsing a crop suffix never fails
//! with an error (a non-matching suffix is the normal case); only building
//! an inconsistent [`Attachment`](crate::Attachment) does.

use derive_more::{Display, Error};

/// A crop error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for crop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The extension is empty.
    #[display("attachment has no extension: {_0}")]
    MissingExtension(#[error(not(source))] String),
    /// The file name does not end with the given extension, or nothing but
    /// the extension is left once it is removed.
    #[display("extension {ext:?} does not end file name {file_name:?}")]
    ExtensionMismatch {
        /// The attachment's file name.
        file_name: String,
        /// The extension that was expected to end it.
        ext: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Attachment data is either consistent or it isn't.
        false
    }
}
