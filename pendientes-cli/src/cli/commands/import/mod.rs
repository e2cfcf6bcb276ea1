//! Import command

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::tracker::import::MergeMode;

pub use handler::handle_import_command;

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// Spreadsheet to import (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
    pub file: PathBuf,

    /// How to combine rows with the current list; asks when omitted
    #[arg(long, short = 'm', value_enum)]
    pub mode: Option<MergeMode>,

    /// 0-based row holding the column headers, detected when omitted
    #[arg(long)]
    pub header_row: Option<usize>,

    /// Show the preview without importing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask before overwriting the current list
    #[arg(long, short = 'y')]
    pub yes: bool,
}
