//! Command dispatch

pub mod export;
pub mod import;
pub mod items;
pub mod stats;

use anyhow::Result;
use colored::*;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::config::repository::SqliteBlobStore;
use crate::tracker::PendingStore;

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Import(args) => import::handle_import_command(args, &config).await,
        Commands::Export(args) => export::handle_export_command(args, &config).await,
        Commands::List {
            filter,
            page,
            page_size,
        } => items::handle_list_command(filter, page, page_size, &config).await,
        Commands::Show { item } => items::handle_show_command(&item, &config).await,
        Commands::Add { top_number, fields } => {
            items::handle_add_command(&top_number, fields, &config).await
        }
        Commands::Edit {
            item,
            top_number,
            fields,
            clear,
        } => items::handle_edit_command(&item, top_number, fields, clear, &config).await,
        Commands::Delete { item, yes } => items::handle_delete_command(&item, yes, &config).await,
        Commands::Clear { yes } => items::handle_clear_command(yes, &config).await,
        Commands::Photo(cmd) => items::handle_photo_command(cmd, &config).await,
        Commands::Stats { filter } => stats::handle_stats_command(filter, &config).await,
        Commands::Options => stats::handle_options_command(&config).await,
    }
}

/// Open the configured database and load the collection
pub async fn open_store(config: &Config) -> Result<PendingStore> {
    let blobs = SqliteBlobStore::open(&config.database_path()).await?;
    Ok(PendingStore::load(Box::new(blobs), &config.slot, config.seed_url.as_deref()).await)
}

/// Tell the user when the last change only lives in memory
pub fn warn_if_unsaved(store: &PendingStore) {
    if store.is_dirty() {
        eprintln!(
            "{} {}",
            "Warning:".yellow().bold(),
            "changes could not be saved and will be lost when the program exits"
        );
    }
}
