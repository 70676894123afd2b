//! File name splitting.

/// Returns the extension of the last path segment of `name`, including the
/// leading dot, or `None` if that segment has no dot.
///
/// Only `/` separates segments; object keys and URLs both use it.
///
/// # Examples
///
/// ```
/// use recrop_crops::extension;
/// assert_eq!(extension("https://example.com/uploads/photo.png"), Some(".png"));
/// assert_eq!(extension("archive.tar.gz"), Some(".gz"));
/// assert_eq!(extension("some.dir/README"), None);
/// ```
pub fn extension(name: &str) -> Option<&str> {
    let segment_start = memchr::memrchr(b'/', name.as_bytes()).map_or(0, |i| i + 1);
    let dot = memchr::memrchr(b'.', &name.as_bytes()[segment_start..])?;
    Some(&name[segment_start + dot..])
}

/// Returns `file_name` with `ext` removed from its end.
///
/// `None` if `file_name` does not end with `ext`, or if nothing would be left.
///
/// # Examples
///
/// ```
/// use recrop_crops::stem;
/// assert_eq!(stem("/2020/01/photo.png", ".png"), Some("/2020/01/photo"));
/// assert_eq!(stem("photo.png", ".jpg"), None);
/// ```
pub fn stem<'a>(file_name: &'a str, ext: &str) -> Option<&'a str> {
    file_name.strip_suffix(ext).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", Some(".png"))]
    #[case("/2020/01/photo.jpeg", Some(".jpeg"))]
    #[case("https://example.com/wp-content/uploads/a.b.webp", Some(".webp"))]
    #[case("https://example.com/uploads/no-extension", None)]
    #[case("dotted.dir/no-extension", None)]
    #[case("trailing.", Some("."))]
    #[case("", None)]
    fn test_extension(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension(name), expected);
    }

    #[rstest]
    #[case("photo.png", ".png", Some("photo"))]
    #[case("/2020/01/photo-600x340.png", ".png", Some("/2020/01/photo-600x340"))]
    #[case("photo.png", ".jpeg", None)]
    #[case(".png", ".png", None)]
    fn test_stem(#[case] file_name: &str, #[case] ext: &str, #[case] expected: Option<&str>) {
        assert_eq!(stem(file_name, ext), expected);
    }
}
