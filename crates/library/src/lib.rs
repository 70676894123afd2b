pub mod inventory;

pub use crate::inventory::build_inventory;
