//! Raw spreadsheet cells and payload decoding

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::error::ImportError;

/// A cell value as read from the first sheet, independent of file format
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    /// Numbers, including date cells as their serial value
    Number(f64),
    Bool(bool),
}

/// One sheet row in absolute column order
pub type Row = Vec<Cell>;

impl Cell {
    /// Trimmed textual form of the cell, empty for blanks
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) => Cell::Text(s.clone()),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// Whole numbers print without a fractional part
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Any workbook calamine can open (xlsx, xlsm, xlsb, xls, ods)
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" => Ok(SheetFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat { extension }),
        }
    }
}

/// Decode a spreadsheet payload into rows of the first sheet
pub fn read_rows(bytes: Vec<u8>, format: SheetFormat) -> Result<Vec<Row>, ImportError> {
    let rows = match format {
        SheetFormat::Workbook => read_workbook_rows(bytes)?,
        SheetFormat::Csv => read_csv_rows(&bytes)?,
    };
    log::debug!("Decoded {} rows from {:?} payload", rows.len(), format);
    Ok(rows)
}

fn read_workbook_rows(bytes: Vec<u8>) -> Result<Vec<Row>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        ImportError::Parse {
            message: e.to_string(),
        }
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NotEnoughData)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Parse {
            message: format!("failed to read sheet '{}': {}", sheet_name, e),
        })?;

    // Ranges start at the first used cell; pad so row and column indices are
    // absolute sheet positions.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = vec![Vec::new(); row_offset];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; col_offset];
        row.extend(data_row.iter().map(Cell::from));
        rows.push(row);
    }

    Ok(rows)
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Parse {
            message: format!("CSV line {}: {}", idx + 1, e),
        })?;

        let row: Row = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                if idx == 0 && col == 0 {
                    Cell::from(field.trim_start_matches('\u{feff}'))
                } else {
                    Cell::from(field)
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
