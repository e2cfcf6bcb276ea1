//! Summary and filter-option commands

pub mod handler;

pub use handler::{handle_options_command, handle_stats_command};
