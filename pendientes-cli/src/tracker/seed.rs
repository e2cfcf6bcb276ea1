//! Initial data fetched from a remote JSON document

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::tracker::types::{ItemId, Origin, PendingItem};

/// Fetch and decode the seed document at `url`
pub async fn fetch_seed(url: &str) -> Result<Vec<PendingItem>> {
    log::info!("Fetching seed data from {}", url);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch seed data from {}", url))?;

    if !response.status().is_success() {
        bail!("Seed request failed with HTTP {}", response.status());
    }

    let body = response
        .text()
        .await
        .context("Failed to read seed response body")?;

    decode_seed(&body)
}

/// Decode a JSON array of items.
///
/// Ids in the document are ignored and every item gets a fresh one. Entries
/// that cannot be read as items are skipped with a warning.
pub fn decode_seed(body: &str) -> Result<Vec<PendingItem>> {
    let entries: Vec<Value> = serde_json::from_str(body).context("Seed data is not a JSON array")?;

    let mut items = Vec::with_capacity(entries.len());
    for (idx, mut entry) in entries.into_iter().enumerate() {
        if let Some(obj) = entry.as_object_mut() {
            obj.remove("id");
        }

        match serde_json::from_value::<PendingItem>(entry) {
            Ok(mut item) => {
                item.id = ItemId::new();
                item.origin = Origin::Seed;
                item.normalize();
                items.push(item);
            }
            Err(e) => log::warn!("Skipping seed entry {}: {}", idx, e),
        }
    }

    log::info!("Decoded {} seed items", items.len());
    Ok(items)
}
