//! Binary Error Types
//!
//! Each variant names the stage of a run that failed; the error tree below it
//! carries the details.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("database operation failed")]
    Database,
    #[display("could not open storage")]
    Storage,
    #[display("could not build the attachment inventory")]
    Inventory,
    #[display("storage type `{_0}` is not supported by this build")]
    Unsupported(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database | Self::Inventory)
    }
}
