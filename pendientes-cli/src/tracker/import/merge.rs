//! Merge staged drafts into the primary collection

use std::collections::HashSet;

use crate::tracker::types::{ItemId, PendingItem};

/// How staged rows combine with the existing collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MergeMode {
    /// Replace the whole collection with the staged rows
    #[value(alias = "sobrescribir")]
    Overwrite,
    /// Append only rows whose TOP # is not present yet
    Incremental,
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMode::Overwrite => write!(f, "overwrite"),
            MergeMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Merge `drafts` into `items`, returning how many rows were written.
///
/// Overwrite replaces the collection and reassigns fresh ids with no photos.
/// Incremental appends every draft whose `top_number` is not in the collection
/// before the merge, so repeated TOP # values inside one batch are all kept,
/// as Overwrite keeps them.
pub fn merge_drafts(items: &mut Vec<PendingItem>, drafts: Vec<PendingItem>, mode: MergeMode) -> usize {
    match mode {
        MergeMode::Overwrite => {
            *items = drafts
                .into_iter()
                .map(|mut draft| {
                    draft.id = ItemId::new();
                    draft.photos.clear();
                    draft
                })
                .collect();
            items.len()
        }
        MergeMode::Incremental => {
            let existing: HashSet<String> = items.iter().map(|i| i.top_number.clone()).collect();
            let before = items.len();

            for draft in drafts {
                if !existing.contains(&draft.top_number) {
                    items.push(draft);
                } else {
                    log::debug!("Skipping existing TOP # {}", draft.top_number);
                }
            }

            items.len() - before
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::types::Photo;

    fn items(tops: &[&str]) -> Vec<PendingItem> {
        tops.iter().map(|t| PendingItem::new(*t)).collect()
    }

    #[test]
    fn test_incremental_adds_only_new_top_numbers() {
        let mut primary = items(&["A-001", "A-002", "A-003"]);
        let added = merge_drafts(&mut primary, items(&["A-002", "B-001"]), MergeMode::Incremental);

        assert_eq!(added, 1);
        assert_eq!(primary.len(), 4);
        assert_eq!(primary[3].top_number, "B-001");
    }

    #[test]
    fn test_incremental_is_idempotent() {
        let mut primary = Vec::new();
        let batch = items(&["A-001", "A-002"]);

        assert_eq!(merge_drafts(&mut primary, batch.clone(), MergeMode::Incremental), 2);
        assert_eq!(merge_drafts(&mut primary, batch, MergeMode::Incremental), 0);
        assert_eq!(primary.len(), 2);
    }

    #[test]
    fn test_incremental_keeps_duplicates_in_batch() {
        let mut primary = items(&["A-001"]);
        let mut batch = items(&["B-001", "B-001", "A-001"]);
        batch[1].comments = "second".into();

        assert_eq!(merge_drafts(&mut primary, batch.clone(), MergeMode::Incremental), 2);
        assert_eq!(primary.len(), 3);
        assert_eq!(primary[2].comments, "second");

        // Both modes agree on what a batch with repeats contributes
        let mut overwritten = Vec::new();
        let new_rows: Vec<PendingItem> = batch.into_iter().filter(|d| d.top_number == "B-001").collect();
        assert_eq!(merge_drafts(&mut overwritten, new_rows, MergeMode::Overwrite), 2);
    }

    #[test]
    fn test_incremental_match_is_exact() {
        let mut primary = items(&["a-001"]);
        assert_eq!(merge_drafts(&mut primary, items(&["A-001"]), MergeMode::Incremental), 1);
    }

    #[test]
    fn test_overwrite_replaces_and_reassigns() {
        let mut primary = items(&["OLD-1", "OLD-2"]);
        let mut batch = items(&["NEW-1"]);
        batch[0].photos.push(Photo::from_bytes("image/png", b"x"));
        let draft_id = batch[0].id;

        assert_eq!(merge_drafts(&mut primary, batch, MergeMode::Overwrite), 1);
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].top_number, "NEW-1");
        assert_ne!(primary[0].id, draft_id);
        assert!(primary[0].photos.is_empty());
    }
}
