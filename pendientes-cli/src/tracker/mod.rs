//! Punch-list tracking: item model, spreadsheet import/export and the
//! persisted collection

pub mod excel;
pub mod filter;
pub mod import;
pub mod seed;
pub mod stats;
pub mod store;
pub mod types;

pub use filter::{ItemFilter, paginate};
pub use stats::Summary;
pub use store::{CommitOutcome, PendingStore, StoreError};
