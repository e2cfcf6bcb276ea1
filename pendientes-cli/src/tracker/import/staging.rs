//! Staged import waiting for confirmation

use std::path::{Path, PathBuf};

use crate::tracker::excel::RowWarning;
use crate::tracker::types::PendingItem;

/// Rows shown in an import preview
pub const PREVIEW_ROWS: usize = 10;

/// Validated drafts that have not touched the primary collection yet
#[derive(Debug, Clone, Default)]
pub struct StagedImport {
    drafts: Vec<PendingItem>,
    source: Option<PathBuf>,
    /// 0-based sheet row holding the headers
    header_row: usize,
    /// Rows skipped for lacking a TOP #
    skipped: usize,
    warnings: Vec<RowWarning>,
}

impl StagedImport {
    pub fn new(
        drafts: Vec<PendingItem>,
        header_row: usize,
        skipped: usize,
        warnings: Vec<RowWarning>,
    ) -> Self {
        Self {
            drafts,
            source: None,
            header_row,
            skipped,
            warnings,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn drafts(&self) -> &[PendingItem] {
        &self.drafts
    }

    /// First rows for display
    pub fn sample(&self) -> &[PendingItem] {
        &self.drafts[..self.drafts.len().min(PREVIEW_ROWS)]
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Rows imported with a problem worth reviewing
    pub fn warnings(&self) -> &[RowWarning] {
        &self.warnings
    }

    /// Drop everything staged, including the source file reference
    pub fn discard(&mut self) {
        if let Some(source) = self.source.take() {
            log::info!(
                "Discarded staged import of {} rows from {}",
                self.drafts.len(),
                source.display()
            );
        }
        self.drafts.clear();
        self.warnings.clear();
        self.skipped = 0;
    }

    pub(crate) fn into_drafts(self) -> Vec<PendingItem> {
        self.drafts
    }
}
