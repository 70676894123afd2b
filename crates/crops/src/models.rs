use crate::error::{ErrorKind, Result};
use crate::stem::stem;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One cropped rendition of an attachment's image.
///
/// `dimensions` keeps the digits exactly as they appeared in the filename, so
/// a crop parsed from `-0600x340` renders back as `0600x340` rather than
/// `600x340`. Replacement text is built from this string, never from the
/// parsed numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crop {
    /// Canonical `"<width>x<height>"` string.
    pub dimensions: String,
    pub width: u64,
    pub height: u64,
}
impl Crop {
    pub fn new(width: u64, height: u64) -> Self {
        Self {
            dimensions: format!("{width}x{height}"),
            width,
            height,
        }
    }

    /// The file name suffix for this crop: `-<dimensions><ext>`.
    pub fn suffix(&self, ext: &str) -> String {
        format!("-{}{}", self.dimensions, ext)
    }
}
impl Display for Crop {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.dimensions)
    }
}

/// A media attachment and the crops that actually exist for it in storage.
///
/// Only constructed through [`Attachment::new`], which guarantees that the
/// extension is a proper suffix of the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    /// File name including extension, e.g. `/2020/01/photo.png`.
    file_name: String,
    /// Extension including the leading dot, e.g. `.png`.
    ext: String,
    /// Crops in discovery order.
    pub crops: Vec<Crop>,
}
impl Attachment {
    /// Create an attachment with no known crops.
    ///
    /// Fails when `ext` is empty or is not a proper suffix of `file_name`.
    pub fn new(id: i64, file_name: impl Into<String>, ext: impl Into<String>) -> Result<Self> {
        let file_name = file_name.into();
        let ext = ext.into();
        if ext.is_empty() {
            exn::bail!(ErrorKind::MissingExtension(file_name));
        }
        if stem(&file_name, &ext).is_none() {
            exn::bail!(ErrorKind::ExtensionMismatch { file_name, ext });
        }
        Ok(Self {
            id,
            file_name,
            ext,
            crops: Vec::new(),
        })
    }

    pub fn with_crops(mut self, crops: impl IntoIterator<Item = Crop>) -> Self {
        self.crops.extend(crops);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// The file name without its extension.
    pub fn stem(&self) -> &str {
        // Checked in the constructor.
        &self.file_name[..self.file_name.len() - self.ext.len()]
    }

    /// The file name of one of this attachment's crops.
    pub fn crop_file_name(&self, crop: &Crop) -> String {
        format!("{}{}", self.stem(), crop.suffix(&self.ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_new() {
        let crop = Crop::new(600, 340);
        assert_eq!(crop.dimensions, "600x340");
        assert_eq!(crop.to_string(), "600x340");
        assert_eq!(crop.suffix(".png"), "-600x340.png");
    }

    #[test]
    fn test_attachment_stem() {
        let attachment = Attachment::new(7, "/2020/01/photo.jpeg", ".jpeg").unwrap();
        assert_eq!(attachment.stem(), "/2020/01/photo");
        assert_eq!(attachment.crop_file_name(&Crop::new(300, 200)), "/2020/01/photo-300x200.jpeg");
    }

    #[test]
    fn test_attachment_rejects_bad_extension() {
        let err = Attachment::new(1, "photo.png", ".jpg").unwrap_err();
        assert!(matches!(&*err, ErrorKind::ExtensionMismatch { .. }));
        let err = Attachment::new(1, "photo.png", "").unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingExtension(_)));
        // Nothing left once the extension is gone.
        assert!(Attachment::new(1, ".png", ".png").is_err());
    }

    #[test]
    fn test_with_crops_keeps_discovery_order() {
        let attachment = Attachment::new(1, "a.png", ".png")
            .unwrap()
            .with_crops([Crop::new(400, 320), Crop::new(200, 180)]);
        let widths: Vec<_> = attachment.crops.iter().map(|c| c.width).collect();
        assert_eq!(widths, [400, 200]);
    }
}
