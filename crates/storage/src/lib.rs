//! Object listing for the storage that holds attachment images and their
//! crops.
//!
//! Only listing is needed: which objects exist under a key prefix. Backends
//! are S3-compatible services (feature `s3`), a local directory tree, and an
//! in-memory mock for tests (feature `mock`).

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::ObjectInfo;
pub use crate::path::{normalize_key, validate as validate_path, validate_prefix};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
