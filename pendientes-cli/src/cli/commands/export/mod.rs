//! Export command

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::cli::FilterArgs;

pub use handler::handle_export_command;

#[derive(Args, Debug)]
pub struct ExportCommands {
    /// Output file, defaults to pendientes_<today>.xlsx in the current directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}
