//! Error types for the [`inventory`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An inventory error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an inventory failure.
///
/// ### Data Errors
/// - [`ErrorKind::GuidOutsidePrefix`]
/// - [`ErrorKind::Attachment`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Storage`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Every attachment must live under the same guid prefix; file names are
    /// derived from what follows it.
    #[display("attachment {id} has the guid {guid:?}, but all attachments must start with {prefix:?}")]
    GuidOutsidePrefix {
        id: i64,
        guid: String,
        prefix: String,
    },
    /// The attachment's file name can't be split into stem and extension.
    #[display("attachment {_0} has an unusable file name")]
    Attachment(#[error(not(source))] i64),
    /// Listing objects via a [`recrop_storage::StorageBackend`] failed.
    #[display("listing objects under {_0:?} failed")]
    Storage(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
