//! Repository over the CMS posts table.
//!
//! Attachment posts name the uploaded files; posts and pages carry the
//! content that references them.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{AttachmentRow, ContentRow, PostType, Summary};
use exn::ResultExt;
use sqlx::AnyPool;
use tracing::instrument;

/// Repository for reading attachments and rewriting post content.
///
/// The posts table is `<table_prefix>posts`. Every statement is rendered with
/// the table name once the prefix has been validated.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: AnyPool,
    table: String,
    dry_run: bool,
}
impl Repository {
    /// Create a new repository for the posts table with the given prefix.
    ///
    /// The prefix may only contain ASCII letters, digits and underscores.
    pub fn new(db: &Database, table_prefix: impl AsRef<str>, dry_run: bool) -> Result<Self> {
        let table_prefix = table_prefix.as_ref();
        if !table_prefix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            exn::bail!(ErrorKind::InvalidTablePrefix(table_prefix.to_string()));
        }
        Ok(Self {
            pool: db.pool().clone(),
            table: format!("{table_prefix}posts"),
            dry_run,
        })
    }

    fn query(&self, template: &str) -> String {
        template.replace("{posts}", &self.table)
    }

    /// Count the attachment posts.
    pub async fn count_attachments(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar(&self.query(include_str!("../queries/count_attachments.sql")))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        // COUNT(*) is never negative.
        Ok(total.unsigned_abs())
    }

    /// List all attachment posts, ordered by ID.
    #[instrument("listing attachments", skip(self), fields(table = %self.table))]
    pub async fn attachments(&self) -> Result<Vec<AttachmentRow>> {
        sqlx::query_as(&self.query(include_str!("../queries/list_attachments.sql")))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Pass the content of every post of the given type through `rewrite`,
    /// writing back each row for which it returns new content.
    ///
    /// Everything happens in one transaction: the rows are read inside it and
    /// it is committed once after the last update. Any error, including an
    /// update that does not affect exactly one row, returns early and drops
    /// the transaction, which rolls it back. In dry-run mode no update is
    /// issued and the transaction is rolled back, but the summary still lists
    /// the rows that would have changed.
    #[instrument("rewriting post contents", skip(self, rewrite), fields(table = %self.table, dry_run = self.dry_run))]
    pub async fn rewrite_contents<F>(&self, post_type: PostType, mut rewrite: F) -> Result<Summary>
    where
        F: FnMut(i64, &str) -> Option<String>,
    {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let rows: Vec<ContentRow> = sqlx::query_as(&self.query(include_str!("../queries/list_contents.sql")))
            .bind(post_type.as_str())
            .fetch_all(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let update = self.query(include_str!("../queries/update_content.sql"));

        let mut summary = Summary {
            scanned: rows.len(),
            updated: Vec::new(),
            dry_run: self.dry_run,
        };
        for row in rows {
            let Some(content) = rewrite(row.id, &row.post_content) else {
                continue;
            };
            summary.updated.push(row.id);
            if self.dry_run {
                tracing::info!("Would update {}", row.id);
                continue;
            }
            tracing::info!("Updating {}", row.id);
            let result = sqlx::query(&update)
                .bind(content)
                .bind(row.id)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            if result.rows_affected() != 1 {
                exn::bail!(ErrorKind::UnexpectedRowCount {
                    id: row.id,
                    affected: result.rows_affected(),
                });
            }
        }

        match self.dry_run {
            true => tx.rollback().await.or_raise(|| ErrorKind::Database)?,
            false => tx.commit().await.or_raise(|| ErrorKind::Database)?,
        }
        Ok(summary)
    }
}
