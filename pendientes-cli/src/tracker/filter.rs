//! Filtering, option lists and pagination for the item table

use std::collections::BTreeSet;

use crate::tracker::types::{PendingItem, Priority, Status};

/// Criteria for narrowing the item list. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub discipline: Option<String>,
    pub responsible: Option<String>,
    /// Case-insensitive text searched in TOP #, descriptions and responsible
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        *self == ItemFilter::default()
    }

    pub fn matches(&self, item: &PendingItem) -> bool {
        if self.status.is_some_and(|s| item.status != s) {
            return false;
        }
        if self.priority.is_some_and(|p| item.priority != p) {
            return false;
        }
        if let Some(discipline) = non_empty(&self.discipline) {
            if item.discipline != discipline {
                return false;
            }
        }
        if let Some(responsible) = non_empty(&self.responsible) {
            if item.responsible != responsible {
                return false;
            }
        }
        if let Some(search) = non_empty(&self.search) {
            let needle = search.to_lowercase();
            let haystacks = [
                &item.top_number,
                &item.system_description,
                &item.deficiency_description,
                &item.responsible,
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    /// Items passing the filter, in collection order
    pub fn apply<'a>(&self, items: &'a [PendingItem]) -> Vec<&'a PendingItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Distinct values offered by the filter selectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub disciplines: Vec<String>,
    pub responsibles: Vec<String>,
    pub milestones: Vec<String>,
}

impl FilterOptions {
    /// Sorted, distinct, non-empty values across the collection
    pub fn from_items(items: &[PendingItem]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        Self {
            disciplines: distinct(items.iter().map(|i| &i.discipline)),
            responsibles: distinct(items.iter().map(|i| &i.responsible)),
            milestones: distinct(items.iter().map(|i| &i.associated_milestone)),
        }
    }
}

/// One page of a filtered list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a PendingItem>,
    /// 1-based page number actually shown
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first item shown, 0 when empty
    pub first: usize,
    pub last: usize,
}

/// Slice out a 1-based page. Out-of-range pages clamp to the last page.
pub fn paginate<'a>(items: &[&'a PendingItem], page: usize, page_size: usize) -> Page<'a> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = page.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let slice = if start < end { items[start..end].to_vec() } else { Vec::new() };

    Page {
        first: if slice.is_empty() { 0 } else { start + 1 },
        last: end,
        items: slice,
        number,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<PendingItem> {
        let mut a = PendingItem::new("A-001");
        a.discipline = "M".into();
        a.responsible = "Nelson".into();
        a.system_description = "Bomba de agua".into();
        a.associated_milestone = "PTB".into();
        a.priority = Priority::High;

        let mut b = PendingItem::new("B-002");
        b.discipline = "E".into();
        b.responsible = "Ana".into();
        b.deficiency_description = "Falta etiquetado".into();
        b.set_close_date(NaiveDate::from_ymd_opt(2025, 1, 1));

        let mut c = PendingItem::new("C-003");
        c.discipline = "M".into();
        c.responsible = "Ana".into();
        c.associated_milestone = "SOPLADO".into();

        vec![a, b, c]
    }

    fn tops(items: &[&PendingItem]) -> Vec<String> {
        items.iter().map(|i| i.top_number.clone()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let items = sample();
        let filter = ItemFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&items).len(), 3);
    }

    #[test]
    fn test_combined_filters() {
        let items = sample();

        let open_m = ItemFilter {
            status: Some(Status::Open),
            discipline: Some("M".into()),
            ..Default::default()
        };
        assert_eq!(tops(&open_m.apply(&items)), vec!["A-001", "C-003"]);

        let ana_closed = ItemFilter {
            status: Some(Status::Closed),
            responsible: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(tops(&ana_closed.apply(&items)), vec!["B-002"]);

        let high = ItemFilter {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert_eq!(tops(&high.apply(&items)), vec!["A-001"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = sample();
        let search = |s: &str| ItemFilter {
            search: Some(s.into()),
            ..Default::default()
        };

        assert_eq!(tops(&search("bomba").apply(&items)), vec!["A-001"]);
        assert_eq!(tops(&search("ETIQUETADO").apply(&items)), vec!["B-002"]);
        assert_eq!(tops(&search("c-0").apply(&items)), vec!["C-003"]);
        assert_eq!(search("ana").apply(&items).len(), 2);
        assert_eq!(search("").apply(&items).len(), 3);
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_items(&sample());
        assert_eq!(options.disciplines, vec!["E", "M"]);
        assert_eq!(options.responsibles, vec!["Ana", "Nelson"]);
        assert_eq!(options.milestones, vec!["PTB", "SOPLADO"]);
        assert_eq!(FilterOptions::from_items(&[]), FilterOptions::default());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<PendingItem> = (0..45).map(|i| PendingItem::new(format!("T-{}", i))).collect();
        let refs: Vec<&PendingItem> = items.iter().collect();

        let first = paginate(&refs, 1, 20);
        assert_eq!(first.items.len(), 20);
        assert_eq!((first.first, first.last, first.total_pages), (1, 20, 3));

        let last = paginate(&refs, 3, 20);
        assert_eq!(last.items.len(), 5);
        assert_eq!((last.first, last.last), (41, 45));

        let clamped = paginate(&refs, 99, 20);
        assert_eq!(clamped.number, 3);

        let empty = paginate(&[], 1, 20);
        assert_eq!((empty.first, empty.last, empty.total_pages), (0, 0, 1));
        assert!(empty.items.is_empty());
    }
}
