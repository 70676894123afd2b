//! Path and key validation.
//!
//! Object keys are `/`-separated strings. Whenever a key or key prefix is
//! mapped onto something hierarchical (a directory tree, a bucket prefix)
//! it goes through here first so that it can't escape the storage root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
/// Ensures that paths don't escape the storage root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use recrop_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("2020/01/photo.png").is_ok());
/// assert!(validate_path("/2020/01/photo.png").is_ok());
/// assert!(validate_path("a/../photo.png").is_ok()); // (never leaves root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././correct//./photo.png/").unwrap(),
///     Path::new("correct/photo.png")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls — reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Validates a raw key prefix.
///
/// Unlike paths, key prefixes are matched with plain string comparison:
/// `2020/01/photo` is a prefix of `2020/01/photo-150x150.png`. Everything up
/// to the last `/` is validated and normalized like a path; the part after
/// it is kept verbatim (a trailing `/` therefore survives).
///
/// # Examples
///
/// ```
/// use recrop_storage::validate_prefix;
/// assert_eq!(validate_prefix("/2020/01/photo").unwrap(), "2020/01/photo");
/// assert_eq!(validate_prefix("2020//01/").unwrap(), "2020/01/");
/// assert_eq!(validate_prefix("photo").unwrap(), "photo");
/// assert!(validate_prefix("../photo").is_err());
/// ```
pub fn validate_prefix(prefix: &str) -> Result<String> {
    let (directory, leaf) = prefix.rsplit_once('/').unwrap_or(("", prefix));
    if leaf == ".." || leaf.contains('\0') {
        exn::bail!(ErrorKind::InvalidPath(PathBuf::from(prefix)));
    }
    let directory = directory.trim_start_matches('/');
    if directory.is_empty() {
        return Ok(leaf.to_string());
    }
    let directory = key_from_path(&validate(directory)?)?;
    Ok(format!("{directory}/{leaf}"))
}

/// Normalizes an object key the way [`validate`] normalizes a path: leading,
/// repeated and trailing `/` are dropped, `.` segments removed and `..`
/// segments resolved.
///
/// # Examples
///
/// ```
/// use recrop_storage::normalize_key;
/// assert_eq!(normalize_key("/2020//01/./photo.png").unwrap(), "2020/01/photo.png");
/// assert!(normalize_key("../photo.png").is_err());
/// ```
pub fn normalize_key(key: &str) -> Result<String> {
    key_from_path(&validate(key)?)
}

/// Converts a relative path into a `/`-separated key.
///
/// Fails for components that aren't valid UTF-8: keys are strings.
pub(crate) fn key_from_path(path: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component.as_os_str().to_str() {
            Some(segment) => segments.push(segment),
            None => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(segments.join("/"))
}
