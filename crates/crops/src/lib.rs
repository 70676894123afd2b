//! Crop-variant filename parsing and content rewriting.
//!
//! Image attachments in a CMS are stored alongside resized renditions named
//! by appending `-<width>x<height>` before the extension (`photo.png` has
//! crops such as `photo-600x340.png`). Content written against one set of
//! crops keeps referencing them after the stored set changes. This crate
//! finds those references in free text and decides what each one should
//! point at instead:
//!
//! - [`parse_crop_suffix`] recognizes the `-<width>x<height><ext>` grammar
//!   directly after a stem.
//! - [`stem_offsets`] finds every (non-overlapping) occurrence of a stem.
//! - [`MatchPolicy::resolve`] compares a referenced crop against the crops
//!   that actually exist.
//! - [`Rewriter`] runs all of the above for every [`Attachment`] over a
//!   content string.
//!
//! Everything here is synchronous and pure; the storage listing and database
//! I/O live in other crates.
//!
//! # Example
//!
//! ```
//! use recrop_crops::{Attachment, Crop, MatchPolicy, Rewriter};
//!
//! let attachment = Attachment::new(1, "bcd.png", ".png")
//!     .unwrap()
//!     .with_crops([Crop::new(200, 180), Crop::new(400, 320)]);
//! let rewriter = Rewriter::new(vec![attachment], MatchPolicy::default());
//!
//! let rewrite = rewriter.rewrite("<img src=\"bcd-210x195.png\">").unwrap();
//! assert_eq!(rewrite.content, "<img src=\"bcd-200x180.png\">");
//! // Nothing left to change on the second pass.
//! assert!(rewriter.rewrite(&rewrite.content).is_none());
//! ```

pub mod error;
mod locate;
mod matcher;
mod models;
mod rewrite;
mod scan;
mod stem;

pub use crate::locate::stem_offsets;
pub use crate::matcher::{DEFAULT_TOLERANCE, MatchPolicy, Resolution, Selection};
pub use crate::models::{Attachment, Crop};
pub use crate::rewrite::{Outcome, Rewrite, Rewriter, Substitution};
pub use crate::scan::parse_crop_suffix;
pub use crate::stem::{extension, stem};
