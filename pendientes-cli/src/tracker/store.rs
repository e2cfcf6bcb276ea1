//! The primary item collection and its persistence
//!
//! Every mutation writes the whole collection back to the blob store. A failed
//! write keeps the in-memory change and marks the store dirty so the caller can
//! report it; the next successful write clears the flag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::repository::BlobStore;
use crate::tracker::filter::FilterOptions;
use crate::tracker::import::{MergeMode, StagedImport, merge_drafts};
use crate::tracker::seed;
use crate::tracker::types::{ItemEdit, ItemId, MAX_PHOTOS, PendingItem, Photo, Priority};

const BLOB_VERSION: u32 = 1;

/// Errors from item operations
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    /// Key matches more than one item
    Ambiguous { key: String, matches: usize },
    EmptyTopNumber,
    PhotoLimit {
        current: usize,
        offered: usize,
        max: usize,
    },
    NotAnImage(String),
    PhotoIndex { index: usize, len: usize },
    Persist(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(key) => write!(f, "no item matches '{}'", key),
            StoreError::Ambiguous { key, matches } => {
                write!(f, "'{}' matches {} items, use the full id", key, matches)
            }
            StoreError::EmptyTopNumber => write!(f, "TOP # is required"),
            StoreError::PhotoLimit {
                current,
                offered,
                max,
            } => write!(
                f,
                "item has {} of {} photos, cannot add {} more",
                current, max, offered
            ),
            StoreError::NotAnImage(name) => write!(f, "'{}' is not an image", name),
            StoreError::PhotoIndex { index, len } => {
                write!(f, "photo {} does not exist (item has {})", index + 1, len)
            }
            StoreError::Persist(e) => write!(f, "failed to save changes: {:#}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Persist(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Result of committing a staged import
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(CommitReport),
    /// Incremental import where every TOP # already existed
    NoNewItems,
    /// Nothing was staged
    NothingStaged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub mode: MergeMode,
    /// Rows written into the collection
    pub affected: usize,
    /// Collection size after the merge
    pub total: usize,
    pub persisted: bool,
    /// Refreshed selector values
    pub options: FilterOptions,
}

#[derive(Serialize)]
struct BlobOut<'a> {
    version: u32,
    items: &'a [PendingItem],
}

#[derive(Deserialize)]
struct BlobIn {
    #[serde(default)]
    version: u32,
    items: Vec<Value>,
}

/// Serialize the collection into the stored envelope
pub fn encode_blob(items: &[PendingItem]) -> serde_json::Result<String> {
    serde_json::to_string(&BlobOut {
        version: BLOB_VERSION,
        items,
    })
}

/// Read a stored value: the versioned envelope or a bare array of items.
///
/// Entries that cannot be read are dropped with a warning; every kept item is
/// normalized.
pub fn decode_blob(raw: &str) -> serde_json::Result<Vec<PendingItem>> {
    let entries = match serde_json::from_str::<Value>(raw)? {
        Value::Array(entries) => entries,
        other => {
            let blob: BlobIn = serde_json::from_value(other)?;
            if blob.version > BLOB_VERSION {
                log::warn!(
                    "Stored data has version {}, newer than {}",
                    blob.version,
                    BLOB_VERSION
                );
            }
            blob.items
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let entry = match entry.get("id") {
            // Legacy numeric ids are replaced
            Some(id) if !id.is_string() => strip_id(entry),
            _ => entry,
        };
        match serde_json::from_value::<PendingItem>(entry) {
            Ok(mut item) => {
                if item.normalize() {
                    log::debug!("Repaired stored item {}", item.top_number);
                }
                items.push(item);
            }
            Err(e) => log::warn!("Dropping stored entry {}: {}", idx, e),
        }
    }
    Ok(items)
}

fn strip_id(mut entry: Value) -> Value {
    if let Some(obj) = entry.as_object_mut() {
        obj.remove("id");
    }
    entry
}

/// The primary collection backed by a blob store
pub struct PendingStore {
    items: Vec<PendingItem>,
    blobs: Box<dyn BlobStore>,
    slot: String,
    dirty: bool,
}

impl PendingStore {
    /// Load the collection from `slot`.
    ///
    /// An empty or missing slot is filled from `seed_url` when given. Read,
    /// decode and seed failures are logged and leave the collection empty.
    pub async fn load(blobs: Box<dyn BlobStore>, slot: &str, seed_url: Option<&str>) -> Self {
        let items = match blobs.get(slot).await {
            Ok(Some(raw)) => decode_blob(&raw).unwrap_or_else(|e| {
                log::error!("Stored data in '{}' is unreadable: {}", slot, e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to read stored data: {:#}", e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} items from '{}'", items.len(), slot);

        let mut store = Self {
            items,
            blobs,
            slot: slot.to_string(),
            dirty: false,
        };

        if store.items.is_empty() {
            if let Some(url) = seed_url {
                match seed::fetch_seed(url).await {
                    Ok(seeded) if !seeded.is_empty() => {
                        store.items = seeded;
                        store.save().await;
                    }
                    Ok(_) => log::info!("Seed data is empty"),
                    Err(e) => log::warn!("Could not load seed data: {:#}", e),
                }
            }
        }

        store
    }

    /// Start from an explicit collection without touching storage
    #[cfg(test)]
    pub fn with_items(blobs: Box<dyn BlobStore>, slot: &str, items: Vec<PendingItem>) -> Self {
        Self {
            items,
            blobs,
            slot: slot.to_string(),
            dirty: false,
        }
    }

    pub fn items(&self) -> &[PendingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the last write failed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: ItemId) -> Option<&PendingItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Resolve a user-supplied key: full id, exact TOP #, or id prefix
    pub fn find(&self, key: &str) -> Result<&PendingItem, StoreError> {
        let key = key.trim();

        if let Some(item) = ItemId::parse(key).and_then(|id| self.get(id)) {
            return Ok(item);
        }

        let by_top: Vec<&PendingItem> = self.items.iter().filter(|i| i.top_number == key).collect();
        let candidates = if by_top.is_empty() {
            self.items
                .iter()
                .filter(|i| i.id.matches_prefix(key))
                .collect()
        } else {
            by_top
        };

        match candidates.as_slice() {
            [item] => Ok(item),
            [] => Err(StoreError::NotFound(key.to_string())),
            many => Err(StoreError::Ambiguous {
                key: key.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Add a manually entered item.
    ///
    /// Priority defaults from the milestone unless the edit sets one; status
    /// follows the close date.
    pub async fn create(&mut self, top_number: &str, fields: ItemEdit) -> Result<ItemId, StoreError> {
        let top_number = top_number.trim();
        if top_number.is_empty() {
            return Err(StoreError::EmptyTopNumber);
        }

        let mut item = PendingItem::new(top_number);
        fields.apply(&mut item);
        item.top_number = top_number.to_string();
        if fields.priority.is_none() {
            item.priority = Priority::from_milestone(&item.associated_milestone);
        }

        let id = item.id;
        log::info!("Created item {} ({})", item.top_number, id.short());
        self.items.push(item);
        self.save().await;
        Ok(id)
    }

    /// Apply a partial update, returning the changed field names
    pub async fn edit(&mut self, id: ItemId, edit: &ItemEdit) -> Result<Vec<&'static str>, StoreError> {
        if edit
            .top_number
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(StoreError::EmptyTopNumber);
        }

        let item = self.get_mut(id)?;
        let changed = edit.apply(item);
        if changed.is_empty() {
            return Ok(changed);
        }

        log::info!("Updated {} fields on {}", changed.len(), item.top_number);
        self.save().await;
        Ok(changed)
    }

    pub async fn delete(&mut self, id: ItemId) -> Result<PendingItem, StoreError> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = self.items.remove(idx);
        log::info!("Deleted item {}", removed.top_number);
        self.save().await;
        Ok(removed)
    }

    /// Attach photos, all or none. Returns the new photo count.
    pub async fn add_photos(&mut self, id: ItemId, photos: Vec<Photo>) -> Result<usize, StoreError> {
        let item = self.get_mut(id)?;

        let current = item.photos.len();
        if current + photos.len() > MAX_PHOTOS {
            return Err(StoreError::PhotoLimit {
                current,
                offered: photos.len(),
                max: MAX_PHOTOS,
            });
        }
        if photos.is_empty() {
            return Ok(current);
        }

        item.photos.extend(photos);
        let count = item.photos.len();
        self.save().await;
        Ok(count)
    }

    /// Remove the photo at a 0-based index
    pub async fn remove_photo(&mut self, id: ItemId, index: usize) -> Result<Photo, StoreError> {
        let item = self.get_mut(id)?;
        if index >= item.photos.len() {
            return Err(StoreError::PhotoIndex {
                index,
                len: item.photos.len(),
            });
        }

        let photo = item.photos.remove(index);
        self.save().await;
        Ok(photo)
    }

    /// Merge a staged import into the collection.
    ///
    /// The staged set is consumed in every case. An incremental import that
    /// adds nothing leaves the collection and storage untouched.
    pub async fn commit_import(&mut self, staged: StagedImport, mode: MergeMode) -> CommitOutcome {
        if staged.is_empty() {
            return CommitOutcome::NothingStaged;
        }

        let drafts = staged.into_drafts();
        let offered = drafts.len();
        let affected = merge_drafts(&mut self.items, drafts, mode);

        if mode == MergeMode::Incremental && affected == 0 {
            log::info!("Incremental import of {} rows added nothing", offered);
            return CommitOutcome::NoNewItems;
        }

        log::info!(
            "Committed {} import: {} rows written, {} items total",
            mode,
            affected,
            self.items.len()
        );

        let persisted = self.save().await;
        CommitOutcome::Committed(CommitReport {
            mode,
            affected,
            total: self.items.len(),
            persisted,
            options: self.filter_options(),
        })
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_items(&self.items)
    }

    /// Remove every item
    pub async fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.save().await;
        removed
    }

    /// Write the collection, surfacing the error
    pub async fn persist(&mut self) -> Result<(), StoreError> {
        let encoded = encode_blob(&self.items).map_err(|e| StoreError::Persist(e.into()))?;
        match self.blobs.put(&self.slot, &encoded).await {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                Err(StoreError::Persist(e))
            }
        }
    }

    /// Write the collection, logging a failure instead of returning it
    async fn save(&mut self) -> bool {
        match self.persist().await {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut PendingItem, StoreError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::SqliteBlobStore;
    use crate::config::repository::blobs::MemoryBlobStore;
    use crate::tracker::types::Status;
    use chrono::NaiveDate;

    const SLOT: &str = "pendientes_data";

    fn items(tops: &[&str]) -> Vec<PendingItem> {
        tops.iter().map(|t| PendingItem::new(*t)).collect()
    }

    fn staged(tops: &[&str]) -> StagedImport {
        StagedImport::new(items(tops), 0, 0, Vec::new())
    }

    fn photos(n: u8) -> Vec<Photo> {
        (0..n).map(|i| Photo::from_bytes("image/png", &[i])).collect()
    }

    async fn store_with(tops: &[&str]) -> PendingStore {
        PendingStore::with_items(Box::new(MemoryBlobStore::new()), SLOT, items(tops))
    }

    #[tokio::test]
    async fn test_load_roundtrip_through_sqlite() {
        let blobs = SqliteBlobStore::in_memory().await.unwrap();
        let mut original = items(&["A-001", "A-002", "A-003"]);
        original[1].set_close_date(NaiveDate::from_ymd_opt(2025, 1, 1));
        // Imported with an unreadable close date
        original[2].status = Status::Closed;
        blobs.put(SLOT, &encode_blob(&original).unwrap()).await.unwrap();

        let store = PendingStore::load(Box::new(blobs), SLOT, None).await;
        assert_eq!(store.items(), original.as_slice());
    }

    #[tokio::test]
    async fn test_load_bare_legacy_array() {
        let raw = r#"[{"id": 1718000000000, "top_number": "A-001", "estado": "Cerrado", "fecha_cierre": null}]"#;
        let blobs = MemoryBlobStore::new().with_slot(SLOT, raw);

        let store = PendingStore::load(Box::new(blobs), SLOT, None).await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].status, Status::Closed);
        assert_eq!(store.items()[0].close_date, None);
    }

    #[tokio::test]
    async fn test_load_corrupt_blob_is_empty() {
        let blobs = MemoryBlobStore::new().with_slot(SLOT, "{not json");
        let store = PendingStore::load(Box::new(blobs), SLOT, None).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_top_and_prefix() {
        let store = store_with(&["A-001", "A-002"]).await;
        let first = store.items()[0].id;

        assert_eq!(store.find(&first.to_string()).unwrap().id, first);
        assert_eq!(store.find("A-002").unwrap().top_number, "A-002");
        assert_eq!(store.find(&first.short()).unwrap().id, first);
        assert!(matches!(store.find("Z-999"), Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_duplicate_top_is_ambiguous() {
        let store = store_with(&["A-001", "A-001"]).await;
        assert!(matches!(
            store.find("A-001"),
            Err(StoreError::Ambiguous { matches: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_derives_priority_and_status() {
        let mut store = store_with(&[]).await;

        let fields = ItemEdit {
            associated_milestone: Some("Primera Sincronización".into()),
            close_date: Some(NaiveDate::from_ymd_opt(2025, 3, 1)),
            ..Default::default()
        };
        let id = store.create(" C-010 ", fields).await.unwrap();
        let item = store.get(id).unwrap();
        assert_eq!(item.top_number, "C-010");
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.status, Status::Closed);

        let explicit = ItemEdit {
            associated_milestone: Some("PTB".into()),
            priority: Some(Priority::Low),
            ..Default::default()
        };
        let id = store.create("C-011", explicit).await.unwrap();
        assert_eq!(store.get(id).unwrap().priority, Priority::Low);

        assert!(matches!(
            store.create("  ", ItemEdit::default()).await,
            Err(StoreError::EmptyTopNumber)
        ));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_close_date_rederives_status() {
        let mut store = store_with(&["A-001"]).await;
        let id = store.items()[0].id;

        let close = ItemEdit {
            close_date: Some(NaiveDate::from_ymd_opt(2025, 5, 5)),
            ..Default::default()
        };
        let changed = store.edit(id, &close).await.unwrap();
        assert!(changed.contains(&"status"));
        assert_eq!(store.get(id).unwrap().status, Status::Closed);

        let reopen = ItemEdit {
            close_date: Some(None),
            ..Default::default()
        };
        store.edit(id, &reopen).await.unwrap();
        assert_eq!(store.get(id).unwrap().status, Status::Open);

        let milestone = ItemEdit {
            associated_milestone: Some("PTB".into()),
            ..Default::default()
        };
        store.edit(id, &milestone).await.unwrap();
        assert_eq!(store.get(id).unwrap().priority, Priority::Low);
    }

    #[tokio::test]
    async fn test_delete() {
        let mut store = store_with(&["A-001", "A-002"]).await;
        let id = store.items()[0].id;

        let removed = store.delete(id).await.unwrap();
        assert_eq!(removed.top_number, "A-001");
        assert_eq!(store.len(), 1);
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_photo_cap_rejects_whole_batch() {
        let mut store = store_with(&["A-001"]).await;
        let id = store.items()[0].id;

        assert_eq!(store.add_photos(id, photos(2)).await.unwrap(), 2);

        let err = store.add_photos(id, photos(2)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::PhotoLimit {
                current: 2,
                offered: 2,
                max: 3
            }
        ));
        assert_eq!(store.get(id).unwrap().photos.len(), 2);

        assert_eq!(store.add_photos(id, photos(1)).await.unwrap(), 3);

        store.remove_photo(id, 0).await.unwrap();
        assert_eq!(store.get(id).unwrap().photos.len(), 2);
        assert!(matches!(
            store.remove_photo(id, 5).await,
            Err(StoreError::PhotoIndex { index: 5, len: 2 })
        ));
    }

    #[tokio::test]
    async fn test_incremental_commit_adds_one() {
        let mut store = store_with(&["A-001", "A-002", "A-003"]).await;

        let outcome = store
            .commit_import(staged(&["A-002", "B-001"]), MergeMode::Incremental)
            .await;

        let CommitOutcome::Committed(report) = outcome else {
            panic!("expected a commit, got {:?}", outcome);
        };
        assert_eq!(report.affected, 1);
        assert_eq!(report.total, 4);
        assert!(report.persisted);
        assert_eq!(store.items()[3].top_number, "B-001");
    }

    #[tokio::test]
    async fn test_incremental_commit_with_nothing_new_is_noop() {
        let mut store = store_with(&["A-001"]).await;
        let before = store.items().to_vec();

        let outcome = store
            .commit_import(staged(&["A-001"]), MergeMode::Incremental)
            .await;
        assert_eq!(outcome, CommitOutcome::NoNewItems);
        assert_eq!(store.items(), before.as_slice());

        let empty = store.commit_import(StagedImport::default(), MergeMode::Overwrite).await;
        assert_eq!(empty, CommitOutcome::NothingStaged);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_commit_replaces_collection() {
        let mut store = store_with(&["OLD-1", "OLD-2", "OLD-3"]).await;

        let outcome = store
            .commit_import(staged(&["NEW-1", "NEW-2"]), MergeMode::Overwrite)
            .await;

        let CommitOutcome::Committed(report) = outcome else {
            panic!("expected a commit, got {:?}", outcome);
        };
        assert_eq!(report.affected, 2);
        let tops: Vec<&str> = store.items().iter().map(|i| i.top_number.as_str()).collect();
        assert_eq!(tops, vec!["NEW-1", "NEW-2"]);
    }

    #[tokio::test]
    async fn test_export_then_overwrite_import_keeps_top_numbers() {
        use crate::tracker::excel::SheetFormat;
        use crate::tracker::excel::writer::items_to_xlsx_bytes;
        use crate::tracker::import::{ImportOptions, stage_bytes};
        use std::collections::BTreeSet;

        let mut store = store_with(&["A-001", "A-002", "B-010"]).await;
        store.items[1].set_close_date(NaiveDate::from_ymd_opt(2025, 1, 1));
        store.items[2].associated_milestone = "Soplado".into();
        let before: BTreeSet<String> = store.items().iter().map(|i| i.top_number.clone()).collect();

        let exported: Vec<&PendingItem> = store.items().iter().collect();
        let bytes = items_to_xlsx_bytes(&exported).unwrap();
        let staged = stage_bytes(bytes, SheetFormat::Workbook, &ImportOptions::default()).unwrap();

        let outcome = store.commit_import(staged, MergeMode::Overwrite).await;
        let CommitOutcome::Committed(report) = outcome else {
            panic!("expected a commit, got {:?}", outcome);
        };
        assert_eq!(report.affected, 3);
        assert!(report.persisted);

        let after: BTreeSet<String> = store.items().iter().map(|i| i.top_number.clone()).collect();
        assert_eq!(after, before);
        assert_eq!(store.find("A-002").unwrap().status, Status::Closed);
        assert_eq!(store.find("B-010").unwrap().priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_commit_refreshes_filter_options() {
        let mut store = store_with(&[]).await;
        let mut drafts = items(&["A-001", "A-002"]);
        drafts[0].discipline = "M".into();
        drafts[1].discipline = "E".into();

        let outcome = store
            .commit_import(StagedImport::new(drafts, 0, 0, Vec::new()), MergeMode::Incremental)
            .await;
        let CommitOutcome::Committed(report) = outcome else {
            panic!("expected a commit, got {:?}", outcome);
        };
        assert_eq!(report.options.disciplines, vec!["E", "M"]);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_change_and_marks_dirty() {
        let mut store = PendingStore::with_items(Box::new(MemoryBlobStore::failing()), SLOT, Vec::new());

        let outcome = store
            .commit_import(staged(&["A-001"]), MergeMode::Overwrite)
            .await;
        let CommitOutcome::Committed(report) = outcome else {
            panic!("expected a commit, got {:?}", outcome);
        };
        assert!(!report.persisted);
        assert!(store.is_dirty());
        assert_eq!(store.len(), 1);

        assert!(matches!(store.persist().await, Err(StoreError::Persist(_))));
    }

    #[tokio::test]
    async fn test_mutations_are_written_through() {
        let blobs = SqliteBlobStore::in_memory().await.unwrap();
        let mut store = PendingStore::with_items(Box::new(blobs), SLOT, Vec::new());
        store.create("A-001", ItemEdit::default()).await.unwrap();

        let raw = store.blobs.get(SLOT).await.unwrap().unwrap();
        let decoded = decode_blob(&raw).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].top_number, "A-001");
        assert!(raw.starts_with(r#"{"version":1"#));
    }

    #[test]
    fn test_decode_drops_unreadable_entries() {
        let raw = r#"{"version": 1, "items": [{"top_number": "A-001"}, 42]}"#;
        let decoded = decode_blob(raw).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decode_blob("\"text\"").is_err());
    }
}
