//! Aggregates for the status, priority and discipline charts

use crate::tracker::types::{PendingItem, Priority, Status};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Open or closed items with high priority
    pub high_priority: usize,
    pub open_percent: u32,
    pub closed_percent: u32,
    /// Always High, Medium, Low
    pub by_priority: Vec<(Priority, usize)>,
    /// Disciplines in first-seen order
    pub by_discipline: Vec<(String, usize)>,
}

impl Summary {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a PendingItem>) -> Self {
        let mut total = 0;
        let mut open = 0;
        let mut priority_counts = [0usize; 3];
        let mut by_discipline: Vec<(String, usize)> = Vec::new();

        for item in items {
            total += 1;
            if item.status == Status::Open {
                open += 1;
            }
            if let Some(slot) = Priority::ALL.iter().position(|p| *p == item.priority) {
                priority_counts[slot] += 1;
            }
            match by_discipline.iter_mut().find(|(d, _)| *d == item.discipline) {
                Some((_, count)) => *count += 1,
                None => by_discipline.push((item.discipline.clone(), 1)),
            }
        }

        let closed = total - open;
        let by_priority: Vec<(Priority, usize)> = Priority::ALL
            .iter()
            .copied()
            .zip(priority_counts)
            .collect();

        Self {
            total,
            open,
            closed,
            high_priority: priority_counts[0],
            open_percent: percent(open, total),
            closed_percent: percent(closed, total),
            by_priority,
            by_discipline,
        }
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as u32
}
