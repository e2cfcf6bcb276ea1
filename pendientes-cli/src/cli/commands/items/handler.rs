//! Item command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;

use crate::cli::commands::{open_store, warn_if_unsaved};
use crate::cli::output::{print_item_detail, print_items_table};
use crate::cli::{ClearField, FilterArgs, ItemFields, PhotoCommands};
use crate::config::Config;
use crate::tracker::types::{ItemId, Photo};
use crate::tracker::{ItemFilter, StoreError, paginate};

/// List the filtered items one page at a time
pub async fn handle_list_command(
    filter: FilterArgs,
    page: usize,
    page_size: Option<usize>,
    config: &Config,
) -> Result<()> {
    let store = open_store(config).await?;
    let filter = ItemFilter::from(filter);
    let filtered = filter.apply(store.items());

    if filtered.is_empty() {
        if store.is_empty() {
            println!("No items yet. Use 'pendientes import <file>' or 'pendientes add <TOP #>'.");
        } else {
            println!("No items match the filters ({} items in total).", store.len());
        }
        return Ok(());
    }

    let page_size = page_size.unwrap_or(config.page_size);
    let page = paginate(&filtered, page, page_size);
    print_items_table(&page.items);

    println!();
    println!(
        "{}",
        format!(
            "Showing {}-{} of {} (page {}/{})",
            page.first, page.last, page.total_items, page.number, page.total_pages
        )
        .dimmed()
    );
    if !filter.is_empty() {
        println!("{}", format!("Filtered from {} items", store.len()).dimmed());
    }
    Ok(())
}

pub async fn handle_show_command(key: &str, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let item = store.find(key)?;
    print_item_detail(item);
    Ok(())
}

/// Create an item from command-line fields
pub async fn handle_add_command(top_number: &str, fields: ItemFields, config: &Config) -> Result<()> {
    let mut store = open_store(config).await?;
    let id = store.create(top_number, fields.into_edit(None)).await?;

    if let Some(item) = store.get(id) {
        println!(
            "{} Created {} ({}), priority {}",
            "✓".green().bold(),
            item.top_number.bold(),
            id.short().dimmed(),
            item.priority
        );
    }
    warn_if_unsaved(&store);
    Ok(())
}

pub async fn handle_edit_command(
    key: &str,
    top_number: Option<String>,
    fields: ItemFields,
    clear: Vec<ClearField>,
    config: &Config,
) -> Result<()> {
    let mut store = open_store(config).await?;
    let item = store.find(key)?;
    let id = item.id;

    let mut edit = fields.into_edit(item.location.as_ref());
    edit.top_number = top_number.map(|t| t.trim().to_string());
    for field in clear {
        field.apply(&mut edit);
    }

    if edit.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one field option.");
    }

    let changed = store.edit(id, &edit).await?;
    if changed.is_empty() {
        println!("No changes, values are already set.");
    } else {
        println!("{} Updated {}", "✓".green().bold(), changed.join(", "));
    }
    warn_if_unsaved(&store);
    Ok(())
}

pub async fn handle_delete_command(key: &str, yes: bool, config: &Config) -> Result<()> {
    let mut store = open_store(config).await?;
    let item = store.find(key)?;
    let (id, top_number) = (item.id, item.top_number.clone());

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", top_number))
            .default(false)
            .interact()
            .context("Deletion needs confirmation, pass --yes to skip it")?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(id).await?;
    println!("{} Deleted {}", "✓".green().bold(), top_number.bold());
    warn_if_unsaved(&store);
    Ok(())
}

pub async fn handle_clear_command(yes: bool, config: &Config) -> Result<()> {
    let mut store = open_store(config).await?;
    if store.is_empty() {
        println!("The list is already empty.");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {} items?", store.len()))
            .default(false)
            .interact()
            .context("Clearing needs confirmation, pass --yes to skip it")?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.clear().await;
    println!("{} Deleted {} items", "✓".green().bold(), removed);
    warn_if_unsaved(&store);
    Ok(())
}

pub async fn handle_photo_command(cmd: PhotoCommands, config: &Config) -> Result<()> {
    match cmd {
        PhotoCommands::Add { item, files } => add_photos(&item, files, config).await,
        PhotoCommands::Remove { item, position } => remove_photo(&item, position, config).await,
        PhotoCommands::Save { item, output } => save_photos(&item, output, config).await,
    }
}

async fn add_photos(key: &str, files: Vec<PathBuf>, config: &Config) -> Result<()> {
    let mut store = open_store(config).await?;
    let id = store.find(key)?.id;

    let mut photos = Vec::with_capacity(files.len());
    for path in &files {
        let photo = Photo::from_file(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
            .ok_or_else(|| StoreError::NotAnImage(path.display().to_string()))?;
        photos.push(photo);
    }

    let count = store.add_photos(id, photos).await?;
    println!(
        "{} Added {} photo(s), item now has {}",
        "✓".green().bold(),
        files.len(),
        count
    );
    warn_if_unsaved(&store);
    Ok(())
}

async fn remove_photo(key: &str, position: usize, config: &Config) -> Result<()> {
    if position == 0 {
        anyhow::bail!("Photo positions start at 1");
    }

    let mut store = open_store(config).await?;
    let id = store.find(key)?.id;
    store.remove_photo(id, position - 1).await?;

    println!("{} Removed photo {}", "✓".green().bold(), position);
    warn_if_unsaved(&store);
    Ok(())
}

async fn save_photos(key: &str, output: PathBuf, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let item = store.find(key)?;

    if item.photos.is_empty() {
        println!("{} has no photos.", item.top_number);
        return Ok(());
    }

    tokio::fs::create_dir_all(&output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;

    for (idx, photo) in item.photos.iter().enumerate() {
        let path = output.join(photo_file_name(item.id, idx, photo));
        let bytes = photo
            .decode()
            .with_context(|| format!("Photo {} of {} is corrupt", idx + 1, item.top_number))?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn photo_file_name(id: ItemId, idx: usize, photo: &Photo) -> String {
    let extension = photo
        .mime()
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin");
    format!("{}_{}.{}", id.short(), idx + 1, extension)
}
