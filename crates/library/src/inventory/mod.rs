//! Attachment inventory.
//!
//! Maps the CMS attachment rows onto [`Attachment`](recrop_crops::Attachment)s
//! and fills in the crops that actually exist by listing storage. The
//! primary entry point is [`build_inventory`]; [`attachment_from_guid`] and
//! [`discover_crops`] are its two halves.
//!
//! An attachment whose guid doesn't start with the configured guid prefix
//! fails the whole inventory: file names could not be derived consistently.
//! An attachment whose original file is missing from storage is only
//! reported.

mod discover;
pub mod error;
mod guid;

pub use self::discover::{Presence, build_inventory, discover_crops};
pub use self::guid::{attachment_from_guid, object_key};
