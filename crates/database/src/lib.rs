//! Access to the CMS database.
//!
//! The CMS database is the naming authority for uploaded files: each
//! attachment post records the URL (`guid`) its file was uploaded to. Posts
//! and pages hold the content whose image references get rewritten.
//!
//! # Architecture
//! - [`Database`] wraps the connection pool (sqlx `Any` driver: MySQL in
//!   production, SQLite in tests).
//! - [`Repository`] runs the queries against `<table_prefix>posts`, including
//!   the transactional read-rewrite-update pass.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{AttachmentRow, PostType, Summary};
pub use crate::repo::Repository;
