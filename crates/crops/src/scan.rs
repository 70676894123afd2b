//! Crop suffix grammar.
//!
//! A crop reference is a stem followed by `-<width>x<height><ext>`, where both
//! dimensions are runs of ASCII digits and `<ext>` starts with a dot. Anything
//! after the extension is ignored, because references live inside arbitrary
//! text (`photo-600x340.png" alt=...`).

use crate::models::Crop;

enum State {
    Width,
    Height,
}

/// Parse the crop suffix at the start of `suffix`.
///
/// `suffix` is whatever follows a stem: the rest of an object key, or the
/// rest of a content string after a located stem. `ext` is the attachment's
/// extension including its leading dot.
///
/// Returns `None` when `suffix` does not start with a well-formed
/// `-<width>x<height><ext>`. That is the common case, not an error.
///
/// # Examples
///
/// ```
/// use recrop_crops::parse_crop_suffix;
///
/// let crop = parse_crop_suffix("-600x340.png\" alt=\"\"", ".png").unwrap();
/// assert_eq!((crop.width, crop.height), (600, 340));
///
/// assert!(parse_crop_suffix("-600x340.jpeg", ".png").is_none());
/// assert!(parse_crop_suffix("-850x1080.900.jpg", ".jpg").is_none());
/// ```
pub fn parse_crop_suffix(suffix: &str, ext: &str) -> Option<Crop> {
    let rest = suffix.strip_prefix('-')?;
    let bytes = rest.as_bytes();
    let mut state = State::Width;
    let mut width_end = None;
    let mut height_end = None;
    for (i, &c) in bytes.iter().enumerate() {
        match (&state, c) {
            (_, b'0'..=b'9') => {},
            (State::Width, b'x') if i > 0 => {
                width_end = Some(i);
                state = State::Height;
            },
            (State::Height, b'.') => {
                height_end = Some(i);
                break;
            },
            _ => return None,
        }
    }
    let width_end = width_end?;
    let height_end = height_end?;
    let width = &rest[..width_end];
    let height = &rest[width_end + 1..height_end];
    if height.is_empty() {
        return None;
    }
    // `-<width>x<height>` is a verbatim prefix of `suffix` by construction;
    // the extension has to follow it immediately.
    let literal_len = 1 + width.len() + 1 + height.len();
    if !suffix[literal_len..].starts_with(ext) {
        return None;
    }
    let (Ok(width_value), Ok(height_value)) = (width.parse::<u64>(), height.parse::<u64>()) else {
        tracing::debug!(width, height, "Crop dimensions do not fit in an unsigned integer");
        return None;
    };
    Some(Crop {
        dimensions: format!("{width}x{height}"),
        width: width_value,
        height: height_value,
    })
}
