//! Repository layer for persisted state

pub mod blobs;

pub use blobs::{BlobStore, SqliteBlobStore};
