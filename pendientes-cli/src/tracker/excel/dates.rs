//! Date normalization for spreadsheet cells
//!
//! Cells may hold a spreadsheet serial number, a date string in one of many
//! human formats, or nothing. Everything normalizes to a calendar date or to
//! absent; unreadable input is never an error here.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use super::cells::Cell;

/// Last serial the 1900 date system can express (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

/// The phantom 1900-02-29 that the 1900 date system counts as a real day
const PHANTOM_LEAP_DAY: u64 = 60;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Normalize a cell into a date
pub fn normalize_cell(cell: Option<&Cell>) -> Option<NaiveDate> {
    match cell? {
        Cell::Empty | Cell::Bool(_) => None,
        Cell::Number(serial) => from_serial(*serial),
        Cell::Text(s) => normalize_text(s),
    }
}

/// Normalize a textual value: numeric text is read as a serial
pub fn normalize_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    match s.parse::<f64>() {
        Ok(serial) => from_serial(serial),
        Err(_) => parse_date_str(s),
    }
}

/// Convert a serial from the 1900 date system.
///
/// Serial 1 is 1900-01-01. The system treats 1900 as a leap year, so serial 60
/// is the nonexistent 1900-02-29 and yields `None`; from 61 onward the count is
/// offset by that extra day. The time-of-day fraction is dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }

    let days = serial.floor() as u64;
    let epoch = match days {
        PHANTOM_LEAP_DAY => return None,
        d if d < PHANTOM_LEAP_DAY => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };

    epoch.checked_add_days(Days::new(days))
}

/// Permissive calendar-date parser.
///
/// Day-first is assumed for slash, dash and dot separated dates.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }

    None
}

/// ISO `YYYY-MM-DD` rendering
pub fn format_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Serial for dates from 1900-03-01 onward
    fn to_serial(date: NaiveDate) -> Option<f64> {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let days = date.signed_duration_since(epoch).num_days();
        (days > PHANTOM_LEAP_DAY as i64).then_some(days as f64)
    }

    #[test]
    fn test_serial_conversion() {
        assert_eq!(from_serial(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(from_serial(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(from_serial(60.0), None);
        assert_eq!(from_serial(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(from_serial(45658.0), Some(ymd(2025, 1, 1)));
        assert_eq!(from_serial(45658.75), Some(ymd(2025, 1, 1)));
        assert_eq!(from_serial(0.0), None);
        assert_eq!(from_serial(-3.0), None);
        assert_eq!(from_serial(f64::NAN), None);
        assert_eq!(from_serial(MAX_SERIAL), Some(ymd(9999, 12, 31)));
        assert_eq!(from_serial(MAX_SERIAL + 1.0), None);
    }

    #[test]
    fn test_serial_inverse() {
        let date = ymd(2024, 2, 29);
        let serial = to_serial(date).unwrap();
        assert_eq!(from_serial(serial), Some(date));
        assert_eq!(to_serial(ymd(1900, 1, 15)), None);
    }

    #[test]
    fn test_parse_date_strings() {
        assert_eq!(parse_date_str("2025-01-01"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_date_str("2025/03/04"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("04/03/2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("04-03-2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("2025-03-04T10:30:00Z"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("2025-03-04 10:30:00"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("March 4, 2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("4 Mar 2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("pendiente"), None);
        assert_eq!(parse_date_str("31/02/2025"), None);
        assert_eq!(parse_date_str(""), None);
    }

    #[test]
    fn test_slash_dates_are_day_first() {
        assert_eq!(parse_date_str("04/03/2025"), Some(ymd(2025, 3, 4)));
        assert_eq!(parse_date_str("13/02/2025"), Some(ymd(2025, 2, 13)));
        // Month-first spellings with a day above 12 do not parse
        assert_eq!(parse_date_str("02/13/2025"), None);
        assert_eq!(
            normalize_cell(Some(&Cell::Text("01/12/2024".into()))),
            Some(ymd(2024, 12, 1))
        );
    }

    #[test]
    fn test_normalize_cell() {
        assert_eq!(normalize_cell(None), None);
        assert_eq!(normalize_cell(Some(&Cell::Empty)), None);
        assert_eq!(
            normalize_cell(Some(&Cell::Number(45658.0))),
            Some(ymd(2025, 1, 1))
        );
        assert_eq!(
            normalize_cell(Some(&Cell::Text("45658".into()))),
            Some(ymd(2025, 1, 1))
        );
        assert_eq!(
            normalize_cell(Some(&Cell::Text(" 2025-01-01 ".into()))),
            Some(ymd(2025, 1, 1))
        );
        assert_eq!(normalize_cell(Some(&Cell::Text("n/a".into()))), None);
        assert_eq!(format_iso(&ymd(2025, 1, 9)), "2025-01-09");
    }
}
