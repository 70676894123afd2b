use crate::error::ErrorKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of post whose content gets rewritten.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    #[display("post")]
    Post,
    #[display("page")]
    Page,
}
impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
        }
    }
}
impl FromStr for PostType {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "page" => Ok(Self::Page),
            other => Err(ErrorKind::UnknownPostType(other.to_string())),
        }
    }
}

/// An attachment post as stored: its ID and the upload URL it was created
/// with.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AttachmentRow {
    pub id: i64,
    pub guid: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct ContentRow {
    pub(crate) id: i64,
    pub(crate) post_content: String,
}

/// What a content rewrite did (or, in dry-run mode, would have done).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of rows read.
    pub scanned: usize,
    /// IDs of the rows whose content changed, in ascending order.
    pub updated: Vec<i64>,
    /// `true` if the changes were rolled back instead of committed.
    pub dry_run: bool,
}
