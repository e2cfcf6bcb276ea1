//! Spreadsheet import/export for pending items

pub mod cells;
pub mod dates;
pub mod error;
pub mod header;
pub mod rows;
pub mod writer;

pub use cells::{Row, SheetFormat, read_rows};
pub use error::{ImportError, RowWarning};
pub use header::{Field, HeaderMap, HeaderTable};
pub use rows::{RowRules, validate_row};
pub use writer::{default_file_name, write_items_excel};
