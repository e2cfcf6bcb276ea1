//! Export command handler

use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use super::ExportCommands;
use crate::cli::commands::open_store;
use crate::config::Config;
use crate::tracker::ItemFilter;
use crate::tracker::excel::{default_file_name, write_items_excel};

/// Write the filtered view to an Excel file
pub async fn handle_export_command(args: ExportCommands, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let filter = ItemFilter::from(args.filter);
    let items = filter.apply(store.items());

    let path = args.output.unwrap_or_else(|| {
        PathBuf::from(default_file_name(chrono::Local::now().date_naive()))
    });

    if items.is_empty() {
        log::warn!("Exporting an empty list");
    }

    write_items_excel(&items, &path).await?;

    println!(
        "{} Exported {} of {} items to {}",
        "✓".green().bold(),
        items.len().to_string().bold(),
        store.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}
