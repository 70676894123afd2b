//! `recrop` rewrites references to image crops that no longer exist.
//!
//! Crop variants of uploaded images are named `<stem>-<width>x<height><ext>`.
//! When crop sizes change, content keeps pointing at crops that are gone. For
//! every post this swaps each such reference for an existing crop of a
//! similar width, or for the original image, in one transaction.

mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use recrop_config::{Config, StorageConfig};
use recrop_crops::Rewriter;
use recrop_database::{Database, Repository, Summary};
use recrop_library::build_inventory;
use recrop_storage::BackendHandle;
use recrop_storage::StorageBackend;
use recrop_storage::backend::LocalBackend;
#[cfg(feature = "s3")]
use recrop_storage::backend::S3Backend;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_env_filter(cli.env_filter()).init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(retryable = err.is_retryable(), "{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref(), &cli.overrides()).or_raise(|| ErrorKind::Config)?;
    let db = Database::connect(&config.database.url).await.or_raise(|| ErrorKind::Database)?;
    let result = match open_backend(&config.storage) {
        Ok(backend) => sync(&config, &db, backend.as_ref()).await,
        Err(err) => Err(err),
    };
    db.close().await;
    let summary = result?;
    if let Some(summary) = summary {
        let verb = if summary.dry_run { "would be updated" } else { "updated" };
        tracing::info!("Scanned {} {}s, {} {verb}", summary.scanned, config.post_type, summary.updated.len());
    }
    Ok(())
}

fn open_backend(storage: &StorageConfig) -> Result<BackendHandle> {
    match storage {
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            bucket,
            prefix,
            region,
            endpoint,
            key_id,
            key_secret,
        } => {
            let backend = S3Backend::new("s3", bucket, prefix.clone(), region, endpoint.clone(), key_id, key_secret)
                .or_raise(|| ErrorKind::Storage)?;
            Ok(Arc::new(backend))
        },
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => exn::bail!(ErrorKind::Unsupported("s3")),
        StorageConfig::Local { root, prefix } => {
            let root = match prefix {
                Some(prefix) => root.join(prefix),
                None => root.clone(),
            };
            Ok(Arc::new(LocalBackend::new("local", root).or_raise(|| ErrorKind::Storage)?))
        },
    }
}

/// One full pass: inventory, then the transactional rewrite. Returns `None`
/// when there is nothing to match against.
async fn sync(config: &Config, db: &Database, backend: &dyn StorageBackend) -> Result<Option<Summary>> {
    let repo = Repository::new(db, &config.database.table_prefix, config.dry_run).or_raise(|| ErrorKind::Database)?;
    if repo.count_attachments().await.or_raise(|| ErrorKind::Database)? == 0 {
        tracing::info!("There aren't any attachments to sync up.");
        return Ok(None);
    }
    let rows = repo.attachments().await.or_raise(|| ErrorKind::Database)?;
    tracing::info!("Retrieved {} attachment posts", rows.len());

    let attachments =
        build_inventory(backend, &rows, &config.guid_prefix).await.or_raise(|| ErrorKind::Inventory)?;
    if attachments.is_empty() {
        tracing::info!("There aren't any attachments to sync up.");
        return Ok(None);
    }

    let rewriter = Rewriter::new(attachments, config.matching.policy());
    let summary = repo
        .rewrite_contents(config.post_type, |id, content| {
            let rewrite = rewriter.rewrite(content)?;
            for substitution in &rewrite.substitutions {
                tracing::debug!(
                    post = id,
                    attachment = substitution.attachment,
                    outcome = ?substitution.outcome,
                    "{} -> {}",
                    substitution.original,
                    substitution.replacement
                );
            }
            Some(rewrite.content)
        })
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(Some(summary))
}
