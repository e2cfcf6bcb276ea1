//! Import pipeline: payload → rows → header mapping → validation → staging
//!
//! Staging never touches the primary collection. Committing a staged import
//! goes through [`crate::tracker::store::PendingStore::commit_import`].

pub mod merge;
pub mod staging;

use std::path::Path;

use crate::tracker::excel::{
    Field, HeaderMap, HeaderTable, ImportError, Row, RowRules, SheetFormat, read_rows,
    validate_row,
};

pub use merge::{MergeMode, merge_drafts};
pub use staging::StagedImport;

/// Rows scanned when looking for the header row
const HEADER_SCAN_ROWS: usize = 5;

/// Where the header row is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderRow {
    /// First of the leading rows that names a TOP # column
    #[default]
    Auto,
    /// Fixed 0-based row index
    Index(usize),
}

/// Options for one import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub header_row: HeaderRow,
    pub headers: HeaderTable,
    pub rules: RowRules,
}

/// Read a spreadsheet file and stage its valid rows
pub async fn stage_file(path: &Path, options: &ImportOptions) -> Result<StagedImport, ImportError> {
    let format = SheetFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Importing {} ({} bytes)", path.display(), bytes.len());
    Ok(stage_bytes(bytes, format, options)?.with_source(path))
}

/// Stage a raw spreadsheet payload
pub fn stage_bytes(
    bytes: Vec<u8>,
    format: SheetFormat,
    options: &ImportOptions,
) -> Result<StagedImport, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::NotEnoughData);
    }
    let rows = read_rows(bytes, format)?;
    stage_rows(&rows, options)
}

/// Map, validate and stage already-decoded rows
pub fn stage_rows(rows: &[Row], options: &ImportOptions) -> Result<StagedImport, ImportError> {
    if rows.len() < 2 {
        return Err(ImportError::NotEnoughData);
    }

    let (header_idx, headers) = locate_header(rows, options)?;
    log::debug!(
        "Header row {} maps {} columns, missing: {:?}",
        header_idx,
        headers.len(),
        headers.missing()
    );
    if headers.is_empty() {
        log::warn!("Header row {} has no recognised column names", header_idx);
    }

    let mut drafts = Vec::new();
    let mut warnings = Vec::new();
    let mut skipped = 0;

    for (offset, row) in rows.iter().enumerate().skip(header_idx + 1) {
        match validate_row(row, &headers, &options.rules, offset + 1) {
            Some(draft) => {
                if let Some(warning) = draft.warning {
                    log::warn!("{}", warning);
                    warnings.push(warning);
                }
                drafts.push(draft.item);
            }
            None => skipped += 1,
        }
    }

    if drafts.is_empty() {
        log::warn!("No valid rows ({} without TOP #)", skipped);
        return Err(ImportError::NoValidRows);
    }

    log::info!(
        "Staged {} rows ({} skipped, {} with warnings)",
        drafts.len(),
        skipped,
        warnings.len()
    );
    Ok(StagedImport::new(drafts, header_idx, skipped, warnings))
}

fn locate_header(rows: &[Row], options: &ImportOptions) -> Result<(usize, HeaderMap), ImportError> {
    match options.header_row {
        HeaderRow::Index(idx) => {
            let row = rows.get(idx).ok_or(ImportError::NotEnoughData)?;
            Ok((idx, options.headers.map_headers(row)))
        }
        HeaderRow::Auto => {
            let found = rows
                .iter()
                .take(HEADER_SCAN_ROWS)
                .enumerate()
                .map(|(idx, row)| (idx, options.headers.map_headers(row)))
                .find(|(_, map)| map.contains(Field::TopNumber));

            Ok(found.unwrap_or_else(|| (0, options.headers.map_headers(&rows[0]))))
        }
    }
}
