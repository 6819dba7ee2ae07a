//! Date utilities for spreadsheet cells

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01
const EXCEL_EPOCH: i64 = 25569;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Convert a spreadsheet serial number to a calendar day.
///
/// The fractional (time-of-day) part is dropped. Returns `None` for
/// non-finite or negative serials.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor() as i64;
    unix_epoch().checked_add_signed(Duration::try_days(days - EXCEL_EPOCH)?)
}

/// Convert a calendar day to a spreadsheet serial number
pub fn date_to_excel_serial(date: NaiveDate) -> f64 {
    (date - unix_epoch()).num_days() as f64 + EXCEL_EPOCH as f64
}

/// Parse a textual date, truncating any time-of-day component.
///
/// Tries plain date layouts first, then datetime layouts, then RFC 3339.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Format a day as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_conversion() {
        // 44562 is 2022-01-01
        assert_eq!(excel_serial_to_date(44562.0), Some(ymd(2022, 1, 1)));
        assert_eq!(excel_serial_to_date(44562.75), Some(ymd(2022, 1, 1)));
        assert_eq!(date_to_excel_serial(ymd(2022, 1, 1)), 44562.0);
    }

    #[test]
    fn test_excel_serial_rejects_garbage() {
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
    }

    #[test]
    fn test_parse_date_text_layouts() {
        let expected = ymd(2024, 1, 15);
        assert_eq!(parse_date_text("2024-01-15"), Some(expected));
        assert_eq!(parse_date_text("2024/01/15"), Some(expected));
        assert_eq!(parse_date_text("01/15/2024"), Some(expected));
        assert_eq!(parse_date_text("15-Jan-2024"), Some(expected));
        assert_eq!(parse_date_text(" 2024-01-15 08:30:00 "), Some(expected));
        assert_eq!(parse_date_text("2024-01-15T08:30:00"), Some(expected));
        assert_eq!(parse_date_text("2024-01-15T08:30:00+02:00"), Some(expected));
    }

    #[test]
    fn test_parse_date_text_invalid() {
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("yesterday"), None);
        assert_eq!(parse_date_text("2024-13-40"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2024, 3, 5)), "2024-03-05");
    }
}
