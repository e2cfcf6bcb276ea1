//! Import command handler: stage, preview, choose a mode, commit

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Select};

use super::ImportCommands;
use crate::cli::commands::{open_store, warn_if_unsaved};
use crate::cli::output::print_items_table;
use crate::config::Config;
use crate::tracker::CommitOutcome;
use crate::tracker::import::{MergeMode, StagedImport, stage_file};

const MODE_CHOICES: [&str; 3] = [
    "Incremental: add only rows with a new TOP #",
    "Overwrite: replace the whole list",
    "Cancel",
];

/// Handle the import command
pub async fn handle_import_command(args: ImportCommands, config: &Config) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("File does not exist: {}", args.file.display());
    }

    let options = config.import_options(args.header_row);
    let mut staged = stage_file(&args.file, &options)
        .await
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    print_preview(&staged);

    if args.dry_run {
        staged.discard();
        println!("{}", "Dry run, nothing was imported.".dimmed());
        return Ok(());
    }

    let mode = match args.mode {
        Some(mode) => mode,
        None => match prompt_mode()? {
            Some(mode) => mode,
            None => {
                staged.discard();
                println!("Import cancelled.");
                return Ok(());
            }
        },
    };

    let mut store = open_store(config).await?;

    if mode == MergeMode::Overwrite && !args.yes && !store.is_empty() {
        let prompt = format!(
            "Replace all {} current items with {} imported rows?",
            store.len(),
            staged.len()
        );
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Overwrite needs confirmation, pass --yes to skip it")?;
        if !confirmed {
            staged.discard();
            println!("Import cancelled.");
            return Ok(());
        }
    }

    match store.commit_import(staged, mode).await {
        CommitOutcome::Committed(report) => {
            let verb = match report.mode {
                MergeMode::Overwrite => "Imported",
                MergeMode::Incremental => "Added",
            };
            println!(
                "{} {} {} items ({} mode), {} in total",
                "✓".green().bold(),
                verb,
                report.affected.to_string().bold(),
                report.mode,
                report.total
            );
            if !report.persisted {
                warn_if_unsaved(&store);
            }
        }
        CommitOutcome::NoNewItems => {
            println!(
                "{} No new items: every TOP # in the file already exists.",
                "!".yellow().bold()
            );
        }
        CommitOutcome::NothingStaged => {
            println!("Nothing to import.");
        }
    }

    Ok(())
}

fn print_preview(staged: &StagedImport) {
    if let Some(source) = staged.source() {
        println!("{} {}", "Source:".bold(), source.display().to_string().cyan());
    }
    println!(
        "{} row {}, {} valid rows, {} without TOP #, {} warnings",
        "Header:".bold(),
        staged.header_row(),
        staged.len().to_string().green(),
        staged.skipped(),
        staged.warnings().len()
    );

    for warning in staged.warnings() {
        println!("  {} {}", "!".yellow(), warning);
    }
    println!();

    print_items_table(&staged.sample().iter().collect::<Vec<_>>());
    if staged.len() > staged.sample().len() {
        println!(
            "{}",
            format!("… and {} more rows", staged.len() - staged.sample().len()).dimmed()
        );
    }
    println!();
}

fn prompt_mode() -> Result<Option<MergeMode>> {
    let choice = Select::new()
        .with_prompt("How should these rows be imported?")
        .items(&MODE_CHOICES)
        .default(0)
        .interact_opt()
        .context("No --mode given and no terminal to ask for one")?;

    Ok(match choice {
        Some(0) => Some(MergeMode::Incremental),
        Some(1) => Some(MergeMode::Overwrite),
        _ => None,
    })
}
