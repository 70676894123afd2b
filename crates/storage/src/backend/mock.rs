//! In-memory storage backend for testing.

use super::ObjectInfoStream;
use crate::StorageBackend;
use crate::models::ObjectInfo;
use crate::path::{key_from_path, validate as validate_path};
use crate::validate_prefix;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Objects are kept in a sorted map behind a [`RwLock`], so listings come back
/// in lexicographic key order the way S3 returns them. Only metadata is kept;
/// nothing in this crate ever reads object contents.
///
/// # Examples
///
/// ```
/// use recrop_storage::backend::{MockBackend, StorageBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_keys(["2020/01/photo.png", "2020/01/photo-150x150.png"]);
/// let objects = backend.list(Some("2020/01/photo")).await?;
/// assert_eq!(objects.len(), 2);
///
/// backend.insert("2020/01/photo-300x200.png", 1024).await;
/// assert_eq!(backend.list(Some("2020/01/photo-")).await?.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    objects: RwLock<BTreeMap<String, (OffsetDateTime, u64)>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with objects and their sizes.
    ///
    /// Panics if any key fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl AsRef<str>, u64)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let objects = files.into_iter().map(|(key, size)| (Self::key(key.as_ref()), (now, size))).collect();
        Self {
            name: "mock".to_string(),
            objects: RwLock::new(objects),
        }
    }

    /// Create a mock backend pre-populated with empty objects.
    pub fn with_keys(keys: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self::with_files(keys.into_iter().map(|key| (key, 0)))
    }

    /// Change the name of the mock backend.
    ///
    /// # Example
    ///
    /// ```
    /// use recrop_storage::backend::MockBackend;
    ///
    /// let backend = MockBackend::default().with_name("uploads");
    /// ```
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add (or replace) an object after construction.
    pub async fn insert(&self, key: &str, size: u64) {
        let key = Self::key(key);
        self.objects.write().await.insert(key, (OffsetDateTime::now_utc(), size));
    }

    fn key(key: &str) -> String {
        match validate_path(key).and_then(|path| key_from_path(&path)) {
            Ok(key) => key,
            // The panic here is DELIBERATE. MockBackend is intended to be
            // used in tests; panics are expected. There is no error result.
            Err(_) => panic!("MockBackend: invalid key {key}"),
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        Self::with_keys(Vec::<&str>::new())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> ObjectInfoStream<'a> {
        let prefix = match prefix.map(validate_prefix).transpose() {
            Ok(pfx) => pfx.unwrap_or_default(),
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot matching entries under the read lock, then drop it
            // before yielding to avoid holding the lock across yield points.
            let entries: Vec<ObjectInfo> = {
                let guard = self.objects.read().await;
                guard
                    .range(prefix.clone()..)
                    .take_while(|(key, _)| key.starts_with(&prefix))
                    .map(|(key, (modified, size))| ObjectInfo::new(key.clone(), *size, *modified))
                    .collect()
            };
            for object in entries {
                yield Ok(object);
            }
        })
    }
}
