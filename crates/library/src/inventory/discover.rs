use super::error::{ErrorKind, Result};
use super::guid::{attachment_from_guid, object_key};
use exn::ResultExt;
use futures::TryStreamExt;
use recrop_crops::{Attachment, parse_crop_suffix};
use recrop_database::AttachmentRow;
use recrop_storage::{StorageBackend, normalize_key};
use tracing::instrument;

/// Whether the original file of an attachment was found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Found,
    Missing,
}

/// Fill in the crops of one attachment from the objects that exist in
/// storage.
///
/// Lists every object whose key starts with the attachment's key minus its
/// extension. The object with exactly the attachment's key is the original;
/// every other object is a crop if the rest of its key parses as a crop
/// suffix for the attachment's extension. Anything else sharing the prefix
/// (`photograph.png` next to `photo.png`) is ignored.
///
/// A missing original is reported but not fatal: its crops are still used.
/// A file name that doesn't map onto a key inside the storage root (`../x.png`)
/// is reported as missing without listing anything.
pub async fn discover_crops(backend: &dyn StorageBackend, attachment: &mut Attachment) -> Result<Presence> {
    // Backends list under normalized prefixes, so keys are compared normalized too.
    let key = normalize_key(object_key(attachment.file_name())).ok().filter(|key| key.ends_with(attachment.ext()));
    let Some(key) = key else {
        tracing::warn!(
            attachment = attachment.id,
            file = attachment.file_name(),
            "Skipping file name outside of the storage root"
        );
        return Ok(Presence::Missing);
    };
    let prefix = &key[..key.len() - attachment.ext().len()];
    let mut presence = Presence::Missing;

    let mut objects = backend.list_stream(Some(prefix));
    while let Some(object) = objects.try_next().await.or_raise(|| ErrorKind::Storage(prefix.to_string()))? {
        if object.key == key {
            presence = Presence::Found;
            continue;
        }
        let Some(suffix) = object.key.strip_prefix(prefix) else {
            continue;
        };
        if let Some(crop) = parse_crop_suffix(suffix, attachment.ext()) {
            attachment.crops.push(crop);
        }
    }

    if presence == Presence::Missing {
        tracing::warn!(attachment = attachment.id, backend = backend.name(), "there is no file named {key}");
    }
    Ok(presence)
}

/// Build the inventory: every attachment row with an extension, in row
/// order, with the crops that exist in storage.
///
/// All rows are checked before anything is listed, so an inconsistent guid
/// fails the run before any storage request is made.
#[instrument("building attachment inventory", skip_all, fields(backend = backend.name(), rows = rows.len()))]
pub async fn build_inventory(
    backend: &dyn StorageBackend,
    rows: &[AttachmentRow],
    guid_prefix: &str,
) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(attachment) = attachment_from_guid(row.id, &row.guid, guid_prefix)? {
            attachments.push(attachment);
        }
    }
    let mut missing = 0usize;
    for attachment in &mut attachments {
        if discover_crops(backend, attachment).await? == Presence::Missing {
            missing += 1;
        }
    }
    tracing::info!(attachments = attachments.len(), missing, "Finished listing crop variants in storage");
    Ok(attachments)
}
