//! Field-level edits applied to an existing item

use chrono::NaiveDate;

use super::item::{Location, PendingItem, Priority};

/// A partial update to a pending item.
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears the
/// value. Priority is only changed when set explicitly; editing the milestone
/// never re-derives it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemEdit {
    pub top_number: Option<String>,
    pub week: Option<Option<f64>>,
    pub system_description: Option<String>,
    pub associated_milestone: Option<String>,
    pub discipline: Option<String>,
    pub responsible: Option<String>,
    pub sub_vendor: Option<String>,
    pub comments: Option<String>,
    pub deficiency_description: Option<String>,
    pub input_date: Option<Option<NaiveDate>>,
    pub commitment_date: Option<Option<NaiveDate>>,
    pub target_date: Option<Option<NaiveDate>>,
    pub close_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub location: Option<Option<Location>>,
}

impl ItemEdit {
    pub fn is_empty(&self) -> bool {
        *self == ItemEdit::default()
    }

    /// Apply this edit in place, returning the names of the fields that changed
    pub fn apply(&self, item: &mut PendingItem) -> Vec<&'static str> {
        let mut changed = Vec::new();

        set_field(&mut item.top_number, &self.top_number, "top_number", &mut changed);
        set_field(&mut item.week, &self.week, "week", &mut changed);
        set_field(
            &mut item.system_description,
            &self.system_description,
            "system_description",
            &mut changed,
        );
        set_field(
            &mut item.associated_milestone,
            &self.associated_milestone,
            "associated_milestone",
            &mut changed,
        );
        set_field(&mut item.discipline, &self.discipline, "discipline", &mut changed);
        set_field(&mut item.responsible, &self.responsible, "responsible", &mut changed);
        set_field(&mut item.sub_vendor, &self.sub_vendor, "sub_vendor", &mut changed);
        set_field(&mut item.comments, &self.comments, "comments", &mut changed);
        set_field(
            &mut item.deficiency_description,
            &self.deficiency_description,
            "deficiency_description",
            &mut changed,
        );
        set_field(&mut item.input_date, &self.input_date, "input_date", &mut changed);
        set_field(
            &mut item.commitment_date,
            &self.commitment_date,
            "commitment_date",
            &mut changed,
        );
        set_field(&mut item.target_date, &self.target_date, "target_date", &mut changed);
        set_field(&mut item.priority, &self.priority, "priority", &mut changed);
        set_field(&mut item.location, &self.location, "location", &mut changed);

        // Status follows the close date on every write that touches it
        if let Some(close_date) = self.close_date {
            if item.close_date != close_date {
                changed.push("close_date");
            }
            let previous = item.status;
            item.set_close_date(close_date);
            if item.status != previous {
                changed.push("status");
            }
        }

        changed
    }
}

fn set_field<T: Clone + PartialEq>(
    target: &mut T,
    value: &Option<T>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        if target != value {
            *target = value.clone();
            changed.push(name);
        }
    }
}
