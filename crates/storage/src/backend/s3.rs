//! S3-compatible storage backend.
//!
//! This module provides a storage backend implementation for S3-compatible
//! services including AWS S3, Cloudflare R2, Backblaze B2, and others.
//!
//! # Credentials
//!
//! Credentials are provided explicitly via configuration, as a `key_id` and
//! `key_secret` pair.

use crate::{
    ObjectInfo, StorageBackend,
    backend::ObjectInfoStream,
    error::{ErrorKind, Result},
    path::key_from_path,
    validate_path, validate_prefix,
};
use async_stream::stream;
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    primitives::DateTime,
};
use exn::{OptionExt, ResultExt};
use time::OffsetDateTime;

/// S3-compatible storage backend.
///
/// Lists objects in an S3 bucket, optionally under a key prefix. All keys are
/// relative to the configured prefix (if any).
///
/// # Examples
///
/// ```no_run
/// use recrop_storage::backend::S3Backend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = S3Backend::new(
///     "uploads",
///     "my-bucket",
///     Some("wp-content/uploads".to_string()),
///     "auto",
///     Some("https://<account>.r2.cloudflarestorage.com".to_string()),
///     "access_key_id",
///     "secret_access_key",
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in logging)
    /// * `bucket` - S3 bucket name
    /// * `prefix` - Optional key prefix (acts as virtual directory)
    /// * `region` - AWS region or provider-specific region (e.g., "auto" for R2)
    /// * `endpoint` - Custom endpoint URL for S3-compatible services
    /// * `key_id` - AWS/provider access key ID
    /// * `key_secret` - AWS/provider secret access key
    pub fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        prefix: Option<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Result<Self> {
        let prefix = prefix
            .filter(|p| !p.trim_matches('/').is_empty())
            .map(|p| validate_path(&p).and_then(|path| key_from_path(&path)))
            .transpose()?;
        let bucket = bucket.into();
        if bucket.is_empty() {
            exn::bail!(ErrorKind::BackendError("bucket name must not be empty".to_string()));
        }
        let region = Region::new(region.into());
        let credentials = Credentials::new(key_id, key_secret, None, None, "recrop-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region)
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // Path-style addressing for S3-compatible services (R2, MinIO, etc.)
            .force_path_style(true);
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }
        Ok(Self {
            name: name.into(),
            client: Client::from_conf(config_builder.build()),
            bucket,
            prefix,
        })
    }

    /// Construct the full S3 key prefix from a relative key prefix.
    fn full_key(&self, relative: &str) -> String {
        join_prefix(self.prefix.as_deref(), relative)
    }

    /// Strip the configured prefix from an S3 key to get the relative key.
    fn relative_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        strip_prefix(self.prefix.as_deref(), key)
    }

    /// Convert AWS DateTime to OffsetDateTime.
    fn parse_datetime(dt: &DateTime) -> Result<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(dt.as_nanos())
            .or_raise(|| ErrorKind::BackendError("S3 datetime out of range".to_string()))
    }
}

fn join_prefix(prefix: Option<&str>, relative: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}/{relative}"),
        None => relative.to_string(),
    }
}

fn strip_prefix<'k>(prefix: Option<&str>, key: &'k str) -> Option<&'k str> {
    match prefix {
        Some(prefix) => key.strip_prefix(prefix).and_then(|s| s.strip_prefix('/')),
        None => Some(key),
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> ObjectInfoStream<'a> {
        let relative = match prefix.map(validate_prefix).transpose() {
            Ok(pfx) => pfx.unwrap_or_default(),
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };
        let full = self.full_key(&relative);

        Box::pin(stream! {
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(full)
                .into_paginator()
                .send();
            while let Some(page) = pages.next().await {
                let page = match page.or_raise(|| ErrorKind::Network(format!("failed to list bucket {}", self.bucket))) {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        // The paginator can't continue past a failed page.
                        break;
                    },
                };
                for object in page.contents() {
                    let Some(key) = object.key() else { continue };
                    let Some(relative) = self.relative_key(key) else {
                        tracing::debug!(backend = %self.name, key, "Skipping key outside of configured prefix");
                        continue;
                    };
                    let modified = match object.last_modified().ok_or_raise(|| {
                        ErrorKind::BackendError(format!("S3 object {key} has no last modified time"))
                    }).and_then(Self::parse_datetime) {
                        Ok(modified) => modified,
                        Err(e) => { yield Err(e); continue; },
                    };
                    let size = object.size().and_then(|size| u64::try_from(size).ok()).unwrap_or_default();
                    yield Ok(ObjectInfo::new(relative.to_string(), size, modified));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "2020/01/photo", "2020/01/photo")]
    #[case(None, "", "")]
    #[case(Some("wp-content/uploads"), "2020/01/photo", "wp-content/uploads/2020/01/photo")]
    #[case(Some("wp-content/uploads"), "", "wp-content/uploads/")]
    fn test_join_prefix(#[case] prefix: Option<&str>, #[case] relative: &str, #[case] expected: &str) {
        assert_eq!(join_prefix(prefix, relative), expected);
    }

    #[rstest]
    #[case(None, "2020/01/photo.png", Some("2020/01/photo.png"))]
    #[case(Some("uploads"), "uploads/2020/01/photo.png", Some("2020/01/photo.png"))]
    #[case(Some("uploads"), "uploads-old/photo.png", None)]
    #[case(Some("uploads"), "other/photo.png", None)]
    fn test_strip_prefix(#[case] prefix: Option<&str>, #[case] key: &str, #[case] expected: Option<&str>) {
        assert_eq!(strip_prefix(prefix, key), expected);
    }

    #[test]
    fn test_new_normalizes_prefix() {
        let backend = S3Backend::new("s3", "bucket", Some("/uploads/".to_string()), "auto", None::<String>, "id", "secret")
            .unwrap();
        assert_eq!(backend.prefix.as_deref(), Some("uploads"));
        assert_eq!(backend.full_key("2020/photo"), "uploads/2020/photo");
        assert_eq!(backend.relative_key("uploads/2020/photo.png"), Some("2020/photo.png"));
        let backend = S3Backend::new("s3", "bucket", Some("/".to_string()), "auto", None::<String>, "id", "secret").unwrap();
        assert_eq!(backend.prefix, None);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(S3Backend::new("s3", "", None, "auto", None::<String>, "id", "secret").is_err());
        assert!(S3Backend::new("s3", "bucket", Some("../up".to_string()), "auto", None::<String>, "id", "secret").is_err());
    }
}
