use memchr::memmem;

/// Returns the byte offsets at which `stem` occurs in `content`.
///
/// Matches are non-overlapping and found left to right: after a match at `i`
/// the search resumes at `i + stem.len()`. So `"aa"` occurs in `"aaabc"` only
/// at offset `0`. Existing content depends on this exact behaviour, keep it.
///
/// An empty `stem` never matches.
///
/// # Examples
///
/// ```
/// use recrop_crops::stem_offsets;
/// assert_eq!(stem_offsets("aabgaa", "aa"), [0, 4]);
/// assert_eq!(stem_offsets("aaabc", "aa"), [0]);
/// ```
pub fn stem_offsets(content: &str, stem: &str) -> Vec<usize> {
    if stem.is_empty() {
        return Vec::new();
    }
    memmem::find_iter(content.as_bytes(), stem.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", "n", &[])]
    #[case("abc", "a", &[0])]
    #[case("abac", "a", &[0, 2])]
    #[case("aaabc", "aa", &[0])]
    #[case("aaaa", "aa", &[0, 2])]
    #[case("aabgaa", "aa", &[0, 4])]
    #[case("rabcabcd", "abc", &[1, 4])]
    #[case("rrabcaabcd", "abc", &[2, 6])]
    #[case("rrabaabcd", "abc", &[5])]
    #[case("\tabc_deabc_dekiabc_def", "abc_de", &[1, 7, 15])]
    #[case("", "abc", &[])]
    #[case("abc", "", &[])]
    fn test_stem_offsets(#[case] content: &str, #[case] stem: &str, #[case] expected: &[usize]) {
        assert_eq!(stem_offsets(content, stem), expected);
    }

    #[test]
    fn test_offsets_index_original_string() {
        // Multi-byte characters before the stem shift the byte offsets.
        let content = "héllo /up/photo-1x1.png and /up/photo.png";
        let offsets = stem_offsets(content, "/up/photo");
        assert_eq!(offsets.len(), 2);
        for offset in offsets {
            assert!(content[offset..].starts_with("/up/photo"));
        }
    }
}
