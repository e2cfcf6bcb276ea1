//! Import error types

use std::path::PathBuf;

/// Batch-level import failure. Aborts the import before anything is staged.
#[derive(Debug)]
pub enum ImportError {
    /// File extension is not a spreadsheet format we can read
    UnsupportedFormat { extension: String },
    /// File could not be read from disk
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Payload is not a readable spreadsheet
    Parse { message: String },
    /// Sheet has no header row or no data rows
    NotEnoughData,
    /// Every data row was skipped or rejected
    NoValidRows,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::UnsupportedFormat { extension } => write!(
                f,
                "unsupported file type '{}' (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv)",
                extension
            ),
            ImportError::Read { path, .. } => write!(f, "failed to read {}", path.display()),
            ImportError::Parse { message } => write!(f, "failed to parse spreadsheet: {}", message),
            ImportError::NotEnoughData => write!(f, "the file does not contain enough data"),
            ImportError::NoValidRows => write!(f, "no valid rows found"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Row-level problem. The row is still imported and the warning is listed in
/// the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// Close-date cell is filled in but is not a date
    UnreadableCloseDate {
        /// 1-based sheet row number
        row: usize,
        top_number: String,
        value: String,
    },
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowWarning::UnreadableCloseDate {
                row,
                top_number,
                value,
            } => write!(
                f,
                "row {} ({}): close date '{}' is not a date, imported as closed without one",
                row, top_number, value
            ),
        }
    }
}
