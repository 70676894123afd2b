use super::error::{ErrorKind, Result};
use exn::ResultExt;
use recrop_crops::{Attachment, extension};

/// Turn an attachment row into an [`Attachment`] without any crops.
///
/// Returns `Ok(None)` for a guid without an extension: not likely an image.
/// The file name keeps the leading `/` left over from removing the guid
/// prefix minus its trailing slash.
///
/// # Examples
///
/// ```
/// use recrop_library::inventory::attachment_from_guid;
///
/// let prefix = "https://example.com/wp-content/uploads/";
/// let attachment = attachment_from_guid(7, "https://example.com/wp-content/uploads/2020/01/photo.png", prefix)
///     .unwrap()
///     .unwrap();
/// assert_eq!(attachment.file_name(), "/2020/01/photo.png");
/// assert_eq!(attachment.ext(), ".png");
/// ```
pub fn attachment_from_guid(id: i64, guid: &str, guid_prefix: &str) -> Result<Option<Attachment>> {
    let Some(ext) = extension(guid) else {
        tracing::info!(attachment = id, guid, "Skipping file without extension");
        return Ok(None);
    };
    if !guid.starts_with(guid_prefix) {
        exn::bail!(ErrorKind::GuidOutsidePrefix {
            id,
            guid: guid.to_string(),
            prefix: guid_prefix.to_string(),
        });
    }
    let file_name = &guid[guid_prefix.trim_end_matches('/').len()..];
    let attachment = Attachment::new(id, file_name, ext).or_raise(|| ErrorKind::Attachment(id))?;
    Ok(Some(attachment))
}

/// The object key of a file name, relative to the storage backend's root.
pub fn object_key(file_name: &str) -> &str {
    file_name.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PREFIX: &str = "https://example.com/wp-content/uploads/";

    #[rstest]
    #[case("https://example.com/wp-content/uploads/bcd.png", "/bcd.png", ".png")]
    #[case("https://example.com/wp-content/uploads/2020/01/photo.jpeg", "/2020/01/photo.jpeg", ".jpeg")]
    #[case("https://example.com/wp-content/uploads/photo.final.JPG", "/photo.final.JPG", ".JPG")]
    fn test_attachment_from_guid(#[case] guid: &str, #[case] file_name: &str, #[case] ext: &str) {
        let attachment = attachment_from_guid(1, guid, PREFIX).unwrap().unwrap();
        assert_eq!(attachment.id, 1);
        assert_eq!(attachment.file_name(), file_name);
        assert_eq!(attachment.ext(), ext);
        assert!(attachment.crops.is_empty());
    }

    #[rstest]
    #[case("https://example.com/wp-content/uploads/README")]
    #[case("https://example.com/wp-content/uploads/2020.01/README")]
    // Skipped before the prefix is even checked.
    #[case("https://elsewhere.com/file")]
    fn test_without_extension_is_skipped(#[case] guid: &str) {
        assert!(attachment_from_guid(1, guid, PREFIX).unwrap().is_none());
    }

    #[rstest]
    #[case("https://elsewhere.com/wp-content/uploads/bcd.png")]
    #[case("http://example.com/wp-content/uploads/bcd.png")]
    #[case("https://example.com/wp-content/uploadsbcd.png")]
    fn test_guid_outside_prefix_is_fatal(#[case] guid: &str) {
        let err = attachment_from_guid(42, guid, PREFIX).unwrap_err();
        assert!(matches!(&*err, ErrorKind::GuidOutsidePrefix { id: 42, .. }));
    }

    #[rstest]
    #[case("/2020/01/photo.png", "2020/01/photo.png")]
    #[case("photo.png", "photo.png")]
    fn test_object_key(#[case] file_name: &str, #[case] expected: &str) {
        assert_eq!(object_key(file_name), expected);
    }
}
