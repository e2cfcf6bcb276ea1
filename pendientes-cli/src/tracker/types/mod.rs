//! Core types for punch-list tracking

pub mod edit;
pub mod item;
pub mod photo;

pub use edit::ItemEdit;
pub use item::{ItemId, Location, MAX_PHOTOS, Origin, PendingItem, Priority, Status};
pub use photo::Photo;
