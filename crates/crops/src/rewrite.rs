//! Content rewriting across all attachments.

use crate::locate::stem_offsets;
use crate::matcher::{MatchPolicy, Resolution};
use crate::models::{Attachment, Crop};
use crate::scan::parse_crop_suffix;

/// What a missing crop reference was replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An existing crop within tolerance.
    Close,
    /// The original, un-cropped file.
    Original,
}

/// One replacement rule applied to a content string.
///
/// Every occurrence of `original` in the content was replaced, so a rule
/// found several times in the same content is still reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub attachment: i64,
    pub original: String,
    pub replacement: String,
    /// The crop that was referenced.
    pub referenced: Crop,
    pub outcome: Outcome,
}

/// The result of a rewrite that changed something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub substitutions: Vec<Substitution>,
}

/// Rewrites crop references in content against a fixed set of attachments.
///
/// Attachments are processed in the order given, each one independently:
/// a pass locates the attachment's stem, collects one replacement rule per
/// distinct missing crop reference, then applies all of them. The next
/// attachment's pass scans the content as the previous one left it.
#[derive(Debug, Clone)]
pub struct Rewriter {
    attachments: Vec<Attachment>,
    policy: MatchPolicy,
}
impl Rewriter {
    pub fn new(attachments: Vec<Attachment>, policy: MatchPolicy) -> Self {
        Self { attachments, policy }
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Rewrite `content`, returning `None` if nothing changed.
    ///
    /// Rewriting the returned content again is always a no-op: replacements
    /// are either crops that exist or bare file names without a crop suffix.
    pub fn rewrite(&self, content: &str) -> Option<Rewrite> {
        let mut current = content.to_string();
        let mut substitutions = Vec::new();
        for attachment in &self.attachments {
            let rules = self.rules(&current, attachment);
            for rule in &rules {
                current = current.replace(&rule.original, &rule.replacement);
            }
            substitutions.extend(rules);
        }
        // Rules can cancel each other out across attachments.
        (current != content).then_some(Rewrite { content: current, substitutions })
    }

    /// Collect the replacement rules for one attachment, in the order their
    /// first occurrence appears in `content`.
    fn rules(&self, content: &str, attachment: &Attachment) -> Vec<Substitution> {
        let stem = attachment.stem();
        let mut rules: Vec<Substitution> = Vec::new();
        for offset in stem_offsets(content, stem) {
            let Some(referenced) = parse_crop_suffix(&content[offset + stem.len()..], attachment.ext()) else {
                continue;
            };
            let original = attachment.crop_file_name(&referenced);
            if rules.iter().any(|rule| rule.original == original) {
                continue;
            }
            let (replacement, outcome) = match self.policy.resolve(&referenced, &attachment.crops) {
                Resolution::Exact => continue,
                Resolution::Close(index) => {
                    let close = &attachment.crops[index];
                    tracing::info!(
                        attachment = attachment.id,
                        file = attachment.file_name(),
                        referenced = %referenced,
                        using = %close,
                        "Using width {} instead of {}",
                        close.width,
                        referenced.width
                    );
                    (attachment.crop_file_name(close), Outcome::Close)
                },
                Resolution::Fallback => (attachment.file_name().to_string(), Outcome::Original),
            };
            rules.push(Substitution {
                attachment: attachment.id,
                original,
                replacement,
                referenced,
                outcome,
            });
        }
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn rewriter() -> Rewriter {
        let attachments = vec![
            Attachment::new(1, "abc.png", ".png").unwrap(),
            Attachment::new(2, "bcd.png", ".png").unwrap().with_crops([Crop::new(200, 180), Crop::new(400, 320)]),
            Attachment::new(3, "rjj.jpeg", ".jpeg").unwrap().with_crops([Crop::new(600, 450)]),
            Attachment::new(4, "rrrr-aa.png", ".png").unwrap().with_crops([Crop::new(200, 180)]),
        ];
        Rewriter::new(attachments, MatchPolicy::default())
    }

    fn apply(rewriter: &Rewriter, content: &str) -> String {
        rewriter.rewrite(content).map(|r| r.content).unwrap_or_else(|| content.to_string())
    }

    #[rstest]
    // No replacement needed
    #[case("abc.png", "abc.png")]
    #[case("<img src='abc.png'>", "<img src='abc.png'>")]
    #[case("bcd-200x180.png", "bcd-200x180.png")]
    #[case("rjj-600x450.jpeg", "rjj-600x450.jpeg")]
    // Default to un-cropped
    #[case("abc-400x300.png", "abc.png")]
    #[case("bcd-30x15.png", "bcd.png")]
    #[case("rrrr-aa-1000x10.png", "rrrr-aa.png")]
    // Use close variant
    #[case("bcd-210x195.png", "bcd-200x180.png")]
    // 30% wider
    #[case("bcd-520x305.png", "bcd-400x320.png")]
    #[case("rjj-700x500.jpeg", "rjj-600x450.jpeg")]
    #[case("rrrr-aa-190x170.png", "rrrr-aa-200x180.png")]
    // No matching attachment
    #[case("jkljk-210x195.png", "jkljk-210x195.png")]
    // Wrong extension for the attachment
    #[case("bcd-210x195.jpeg", "bcd-210x195.jpeg")]
    // Ignore surroundings
    #[case("HELLO WORLD bcd-210x195.png", "HELLO WORLD bcd-200x180.png")]
    #[case("Hi: bcd-210x195.png\tText...", "Hi: bcd-200x180.png\tText...")]
    #[case("bcd-210x195.png\tText...", "bcd-200x180.png\tText...")]
    #[case(
        "<a href=\"/bcd.png\"><img src=\"/bcd-210x195.png\" srcset=\"/bcd-30x15.png 30w, /bcd-400x320.png 400w\"></a>",
        "<a href=\"/bcd.png\"><img src=\"/bcd-200x180.png\" srcset=\"/bcd.png 30w, /bcd-400x320.png 400w\"></a>"
    )]
    fn test_rewrite(rewriter: Rewriter, #[case] original: &str, #[case] expected: &str) {
        assert_eq!(apply(&rewriter, original), expected);
    }

    #[rstest]
    #[case("bcd-210x195.png and bcd-30x15.png, abc-1x1.png, rjj-1x1.jpeg")]
    #[case("bcd-210x195.png bcd-210x195.png bcd-210x195.png")]
    #[case("nothing to see here")]
    fn test_rewrite_is_idempotent(rewriter: Rewriter, #[case] original: &str) {
        let once = apply(&rewriter, original);
        assert!(rewriter.rewrite(&once).is_none(), "second pass changed {once:?}");
    }

    #[rstest]
    fn test_unchanged_content_returns_none(rewriter: Rewriter) {
        assert!(rewriter.rewrite("abc.png bcd-400x320.png").is_none());
        assert!(rewriter.rewrite("").is_none());
    }

    #[rstest]
    fn test_repeated_references_collapse_to_one_rule(rewriter: Rewriter) {
        let rewrite = rewriter.rewrite("bcd-210x195.png, bcd-210x195.png and bcd-30x15.png").unwrap();
        assert_eq!(rewrite.content, "bcd-200x180.png, bcd-200x180.png and bcd.png");
        assert_eq!(
            rewrite.substitutions,
            vec![
                Substitution {
                    attachment: 2,
                    original: "bcd-210x195.png".to_string(),
                    replacement: "bcd-200x180.png".to_string(),
                    referenced: Crop::new(210, 195),
                    outcome: Outcome::Close,
                },
                Substitution {
                    attachment: 2,
                    original: "bcd-30x15.png".to_string(),
                    replacement: "bcd.png".to_string(),
                    referenced: Crop::new(30, 15),
                    outcome: Outcome::Original,
                },
            ]
        );
    }

    #[test]
    fn test_attachments_with_paths() {
        let attachments = vec![
            Attachment::new(10, "/2020/01/photo.jpg", ".jpg")
                .unwrap()
                .with_crops([Crop::new(150, 150), Crop::new(1024, 683)]),
        ];
        let rewriter = Rewriter::new(attachments, MatchPolicy::default());
        let content = "<img src=\"https://example.com/wp-content/uploads/2020/01/photo-1000x667.jpg\" />";
        assert_eq!(
            rewriter.rewrite(content).unwrap().content,
            "<img src=\"https://example.com/wp-content/uploads/2020/01/photo-1024x683.jpg\" />"
        );
    }

    #[test]
    fn test_closest_selection() {
        let attachments = vec![
            Attachment::new(1, "x.png", ".png").unwrap().with_crops([Crop::new(505, 1), Crop::new(600, 1)]),
        ];
        let last = Rewriter::new(attachments.clone(), MatchPolicy::default());
        assert_eq!(last.rewrite("x-500x1.png").unwrap().content, "x-600x1.png");
        let closest = Rewriter::new(attachments, MatchPolicy::new(35.0, crate::Selection::Closest));
        assert_eq!(closest.rewrite("x-500x1.png").unwrap().content, "x-505x1.png");
    }
}
