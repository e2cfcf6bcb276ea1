//! Row validation and field derivation

use super::cells::Cell;
use super::dates::normalize_cell;
use super::error::RowWarning;
use super::header::{Field, HeaderMap};
use crate::tracker::types::{Origin, PendingItem, Priority, Status};

/// Variant-specific row rules
#[derive(Debug, Clone, PartialEq)]
pub struct RowRules {
    /// Week used when the cell is missing or not a non-negative number
    pub week_fallback: Option<f64>,
}

impl Default for RowRules {
    fn default() -> Self {
        Self {
            week_fallback: Some(0.0),
        }
    }
}

/// A validated row and anything worth telling the user about it
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRow {
    pub item: PendingItem,
    pub warning: Option<RowWarning>,
}

/// Turn one data row into a draft item.
///
/// Returns `None` for rows without a TOP #, which are silently skipped.
/// `row_number` is the 1-based sheet row used in messages.
pub fn validate_row(
    row: &[Cell],
    headers: &HeaderMap,
    rules: &RowRules,
    row_number: usize,
) -> Option<DraftRow> {
    let top_number = headers.text(row, Field::TopNumber);
    if top_number.is_empty() {
        return None;
    }

    let close_text = headers.text(row, Field::CloseDate);
    let close_date = normalize_cell(headers.cell(row, Field::CloseDate));
    let warning = (close_date.is_none() && !close_text.is_empty()).then(|| {
        RowWarning::UnreadableCloseDate {
            row: row_number,
            top_number: top_number.clone(),
            value: close_text.clone(),
        }
    });

    let mut item = PendingItem::new(top_number);
    item.week = parse_week(&headers.text(row, Field::Week)).or(rules.week_fallback);
    item.system_description = headers.text(row, Field::SystemDescription);
    item.associated_milestone = headers.text(row, Field::AssociatedMilestone);
    item.discipline = headers.text(row, Field::Discipline);
    item.responsible = headers.text(row, Field::Responsible);
    item.sub_vendor = headers.text(row, Field::SubVendor);
    item.comments = headers.text(row, Field::Comments);
    item.deficiency_description = headers.text(row, Field::DeficiencyDescription);
    item.input_date = normalize_cell(headers.cell(row, Field::InputDate));
    item.commitment_date = normalize_cell(headers.cell(row, Field::CommitmentDate));
    item.target_date = normalize_cell(headers.cell(row, Field::TargetDate));
    item.priority = Priority::from_milestone(&item.associated_milestone);
    item.origin = Origin::Imported;

    // Any filled close-date cell closes the row, readable date or not
    item.close_date = close_date;
    item.status = if close_text.is_empty() {
        Status::Open
    } else {
        Status::Closed
    };

    Some(DraftRow { item, warning })
}

fn parse_week(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}
