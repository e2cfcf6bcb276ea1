use anyhow::Result;
use colored::*;

use crate::cli::FilterArgs;
use crate::cli::commands::open_store;
use crate::cli::output::print_summary;
use crate::config::Config;
use crate::tracker::{ItemFilter, Summary};

/// Print charts for the filtered view
pub async fn handle_stats_command(filter: FilterArgs, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let filter = ItemFilter::from(filter);
    let items = filter.apply(store.items());

    let summary = Summary::from_items(items.iter().copied());
    print_summary(&summary);

    if !filter.is_empty() {
        println!();
        println!("{}", format!("Filtered from {} items", store.len()).dimmed());
    }
    Ok(())
}

/// Print the distinct values usable with --discipline and --responsible
pub async fn handle_options_command(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let options = store.filter_options();

    let sections = [
        ("Disciplinas", &options.disciplines),
        ("Responsables", &options.responsibles),
        ("Hitos", &options.milestones),
    ];
    for (title, values) in sections {
        println!("{} ({})", title.bold(), values.len());
        for value in values {
            println!("  {}", value);
        }
        println!();
    }
    Ok(())
}
