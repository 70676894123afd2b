//! Local filesystem storage backend.
//!
//! For sites whose uploads live on disk (or a mounted bucket). Keys are paths
//! relative to a root directory, joined with `/`.

use crate::backend::ObjectInfoStream;
use crate::error::ErrorKind;
use crate::path::key_from_path;
use crate::{ObjectInfo, StorageBackend, error::Result, validate_prefix};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    Object(ObjectInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use recrop_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("uploads", "/var/www/html/wp-content/uploads")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory that keys are relative to
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or is not an existing
    /// directory. Nothing is ever written here, so the root is not created.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Convert an absolute path back to a key relative to the root.
    fn relative_key(&self, absolute: &Path) -> Result<String> {
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        key_from_path(relative)
    }

    fn object_info(key: String, metadata: Metadata) -> Result<ObjectInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(ObjectInfo::new(key, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classify one directory entry. Kept out of the stream so that `?`
    /// works.
    async fn process_entry(&self, entry: DirEntry, prefix: &str) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let key = match self.relative_key(&path) {
            Ok(key) => key,
            Err(_) => {
                tracing::warn!(backend = %self.name, path = %path.display(), "Skipping path that is not valid UTF-8");
                return Ok(WalkEntry::Skip);
            },
        };
        if metadata.is_dir() {
            // Descend only into directories that could hold matching keys.
            let directory = format!("{key}/");
            return Ok(match directory.starts_with(prefix) || prefix.starts_with(&directory) {
                true => WalkEntry::Descend(path),
                false => WalkEntry::Skip,
            });
        }
        if metadata.is_file() && key.starts_with(prefix) {
            return Ok(WalkEntry::Object(Self::object_info(key, metadata)?));
        }
        // Note: silently drop what is most likely a broken symlink.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> ObjectInfoStream<'a> {
        let prefix = match prefix.map(validate_prefix).transpose() {
            Ok(pfx) => pfx.unwrap_or_default(),
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };
        // Start from the deepest directory the prefix names in full, so
        // "2020/01/photo" walks "2020/01" and filters on the leaf.
        let start_dir = match prefix.rsplit_once('/') {
            Some((directory, _)) => self.root.join(directory),
            None => self.root.clone(),
        };
        let mut stack = vec![start_dir];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    // Consistent with object stores: a prefix that matches
                    // nothing is an empty listing.
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.process_entry(entry, &prefix).await {
                        Ok(WalkEntry::Object(o)) => yield Ok(o),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, key: &str) {
        let path = root.join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"data").unwrap();
    }

    async fn keys(backend: &LocalBackend, prefix: Option<&str>) -> Vec<String> {
        let mut keys: Vec<_> = backend.list(prefix).await.unwrap().into_iter().map(|o| o.key).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_new_requires_absolute_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", temp_dir.path().join("missing")).is_err());
        touch(temp_dir.path(), "file.png");
        assert!(LocalBackend::new("name", temp_dir.path().join("file.png")).is_err());
    }

    #[test]
    fn test_relative_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let abs = temp_dir.path().join("2020/01/photo.png");
        assert_eq!(backend.relative_key(&abs).unwrap(), "2020/01/photo.png");
        assert!(backend.relative_key(Path::new("/other/file.png")).is_err());
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(backend.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_all_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "2020/01/photo.png");
        touch(temp_dir.path(), "2020/01/photo-150x150.png");
        touch(temp_dir.path(), "2021/other.jpg");
        touch(temp_dir.path(), "README.md");
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert_eq!(
            keys(&backend, None).await,
            ["2020/01/photo-150x150.png", "2020/01/photo.png", "2021/other.jpg", "README.md"]
        );
    }

    #[tokio::test]
    async fn test_list_with_partial_file_name_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "2020/01/photo.png");
        touch(temp_dir.path(), "2020/01/photo-150x150.png");
        touch(temp_dir.path(), "2020/01/photograph.png");
        touch(temp_dir.path(), "2020/01/other.png");
        touch(temp_dir.path(), "2020/02/photo.png");
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert_eq!(
            keys(&backend, Some("/2020/01/photo")).await,
            ["2020/01/photo-150x150.png", "2020/01/photo.png", "2020/01/photograph.png"]
        );
    }

    #[tokio::test]
    async fn test_list_with_directory_prefixes() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "2020/01/photo.png");
        touch(temp_dir.path(), "2020/11/photo.png");
        touch(temp_dir.path(), "2021/01/photo.png");
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert_eq!(keys(&backend, Some("2020/")).await, ["2020/01/photo.png", "2020/11/photo.png"]);
        assert_eq!(keys(&backend, Some("2020/1")).await, ["2020/11/photo.png"]);
        assert_eq!(keys(&backend, Some("202")).await.len(), 3);
    }

    #[tokio::test]
    async fn test_list_nonexistent_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(backend.list(Some("nonexistent/photo")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_traversal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(backend.list(Some("../etc/passwd")).await.is_err());
    }
}
