//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! listing interface across different backends (local filesystem,
//! S3-compatible services, etc.).

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use crate::models::ObjectInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub(crate) type ObjectInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<ObjectInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// # Key Handling
/// Keys are `/`-separated and relative to the backend's root (a directory,
/// or a bucket plus an optional key prefix). Prefixes are raw string
/// prefixes, the way object stores define them: `2020/01/photo` matches
/// `2020/01/photo.png` and `2020/01/photo-150x150.png`, but also
/// `2020/01/photograph.png`.
///
/// # Examples
///
/// ```
/// use futures::TryStreamExt;
/// # use recrop_storage::{backend::StorageBackend, error::Result};
/// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
/// let mut stream = backend.list_stream(Some("2020/01/photo"));
/// while let Some(object) = stream.try_next().await? {
///     println!("{}: {} bytes", object.key, object.size);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// List all objects whose key starts with an optional prefix.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`] before
    /// returning.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream object metadata matching an optional key prefix.
    ///
    /// Results are yielded incrementally. Listing a prefix that matches
    /// nothing yields an empty stream, not an error.
    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> ObjectInfoStream<'a>;
}
