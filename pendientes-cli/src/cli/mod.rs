//! Command-line interface definition

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use chrono::NaiveDate;

use crate::tracker::ItemFilter;
use crate::tracker::excel::dates::parse_date_str;
use crate::tracker::types::{ItemEdit, Location, Priority, Status};

use commands::export::ExportCommands;
use commands::import::ImportCommands;

#[derive(Parser, Debug)]
#[command(name = "pendientes", about = "Construction punch-list tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import items from an Excel or CSV file
    Import(ImportCommands),

    /// Export the (filtered) item list to an Excel file
    Export(ExportCommands),

    /// List items
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Items per page, defaults to the configured page size
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show every field of one item
    Show {
        /// Item id, id prefix or TOP #
        item: String,
    },

    /// Create an item by hand
    Add {
        /// TOP # of the new item
        top_number: String,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Change fields of an existing item
    Edit {
        /// Item id, id prefix or TOP #
        item: String,

        /// New TOP #
        #[arg(long = "top")]
        top_number: Option<String>,

        #[command(flatten)]
        fields: ItemFields,

        /// Clear a field (repeatable)
        #[arg(long, value_enum)]
        clear: Vec<ClearField>,
    },

    /// Delete an item
    Delete {
        /// Item id, id prefix or TOP #
        item: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete every item
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Manage item photos
    #[command(subcommand)]
    Photo(PhotoCommands),

    /// Show status, priority and discipline summaries
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List the values available for filtering
    Options,
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommands {
    /// Attach image files to an item (at most 3 per item)
    Add {
        /// Item id, id prefix or TOP #
        item: String,

        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove a photo by its 1-based position
    Remove {
        /// Item id, id prefix or TOP #
        item: String,

        position: usize,
    },

    /// Save an item's photos to a directory
    Save {
        /// Item id, id prefix or TOP #
        item: String,

        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        output: PathBuf,
    },
}

/// Filters shared by list, stats and export
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only items with this status
    #[arg(long, value_enum)]
    pub status: Option<Status>,

    /// Only items with this priority
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Only items of this discipline
    #[arg(long)]
    pub discipline: Option<String>,

    /// Only items for this responsible
    #[arg(long)]
    pub responsible: Option<String>,

    /// Text to search in TOP #, descriptions and responsible
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl From<FilterArgs> for ItemFilter {
    fn from(args: FilterArgs) -> Self {
        ItemFilter {
            status: args.status,
            priority: args.priority,
            discipline: args.discipline,
            responsible: args.responsible,
            search: args.search,
        }
    }
}

/// Editable item fields
#[derive(Args, Debug, Clone, Default)]
pub struct ItemFields {
    /// Week number
    #[arg(long)]
    pub week: Option<f64>,

    /// System description
    #[arg(long = "system")]
    pub system_description: Option<String>,

    /// Associated milestone
    #[arg(long)]
    pub milestone: Option<String>,

    #[arg(long)]
    pub discipline: Option<String>,

    #[arg(long)]
    pub responsible: Option<String>,

    /// Sub-contractor or vendor
    #[arg(long)]
    pub sub_vendor: Option<String>,

    #[arg(long)]
    pub comments: Option<String>,

    /// Deficiency description
    #[arg(long = "deficiency")]
    pub deficiency_description: Option<String>,

    /// Input date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, value_parser = parse_date_arg)]
    pub input_date: Option<NaiveDate>,

    /// Commitment date
    #[arg(long = "commitment", value_parser = parse_date_arg)]
    pub commitment_date: Option<NaiveDate>,

    /// Target date
    #[arg(long = "target", value_parser = parse_date_arg)]
    pub target_date: Option<NaiveDate>,

    /// Close date, closes the item
    #[arg(long = "closed", value_parser = parse_date_arg)]
    pub close_date: Option<NaiveDate>,

    /// Priority, derived from the milestone on add when omitted
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Location description
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
}

/// Fields that `edit --clear` can empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClearField {
    Week,
    InputDate,
    Commitment,
    Target,
    Closed,
    Location,
}

impl ItemFields {
    /// Build an edit, merging location parts into `current`
    pub fn into_edit(self, current: Option<&Location>) -> ItemEdit {
        let location = if self.location.is_some() || self.latitude.is_some() || self.longitude.is_some() {
            let mut location = current.cloned().unwrap_or_default();
            if let Some(description) = self.location {
                location.description = description;
            }
            if self.latitude.is_some() {
                location.latitude = self.latitude;
            }
            if self.longitude.is_some() {
                location.longitude = self.longitude;
            }
            Some((!location.is_empty()).then_some(location))
        } else {
            None
        };

        ItemEdit {
            top_number: None,
            week: self.week.map(Some),
            system_description: self.system_description,
            associated_milestone: self.milestone,
            discipline: self.discipline,
            responsible: self.responsible,
            sub_vendor: self.sub_vendor,
            comments: self.comments,
            deficiency_description: self.deficiency_description,
            input_date: self.input_date.map(Some),
            commitment_date: self.commitment_date.map(Some),
            target_date: self.target_date.map(Some),
            close_date: self.close_date.map(Some),
            priority: self.priority,
            location,
        }
    }
}

impl ClearField {
    pub fn apply(self, edit: &mut ItemEdit) {
        match self {
            ClearField::Week => edit.week = Some(None),
            ClearField::InputDate => edit.input_date = Some(None),
            ClearField::Commitment => edit.commitment_date = Some(None),
            ClearField::Target => edit.target_date = Some(None),
            ClearField::Closed => edit.close_date = Some(None),
            ClearField::Location => edit.location = Some(None),
        }
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date_str(s).ok_or_else(|| format!("'{}' is not a date (use YYYY-MM-DD or DD/MM/YYYY)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_edit_with_clear() {
        let cli = Cli::parse_from([
            "pendientes",
            "edit",
            "A-001",
            "--closed",
            "02/05/2025",
            "--clear",
            "target",
            "--priority",
            "alta",
        ]);

        let Commands::Edit {
            item,
            fields,
            clear,
            ..
        } = cli.command
        else {
            panic!("expected edit");
        };
        assert_eq!(item, "A-001");
        assert_eq!(clear, vec![ClearField::Target]);

        let mut edit = fields.into_edit(None);
        for field in clear {
            field.apply(&mut edit);
        }
        assert_eq!(edit.close_date, Some(NaiveDate::from_ymd_opt(2025, 5, 2)));
        assert_eq!(edit.target_date, Some(None));
        assert_eq!(edit.priority, Some(Priority::High));
    }

    #[test]
    fn test_location_parts_merge_with_current() {
        let current = Location {
            description: "Sala de bombas".into(),
            latitude: Some(1.0),
            longitude: Some(2.0),
        };
        let fields = ItemFields {
            latitude: Some(-33.4),
            ..Default::default()
        };

        let edit = fields.into_edit(Some(&current));
        let location = edit.location.flatten().unwrap();
        assert_eq!(location.description, "Sala de bombas");
        assert_eq!(location.latitude, Some(-33.4));
        assert_eq!(location.longitude, Some(2.0));

        assert_eq!(ItemFields::default().into_edit(Some(&current)).location, None);
    }

    #[test]
    fn test_bad_date_argument_is_rejected() {
        let result = Cli::try_parse_from(["pendientes", "add", "A-001", "--closed", "pronto"]);
        assert!(result.is_err());
    }
}
