use crate::datetime::{format_date, parse_date_text};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    String(String),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is stored as a number
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Try to get the value as a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => Some(*i != 0),
            CellValue::Float(f) => Some(*f != 0.0),
            CellValue::String(s) => s.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }

    /// Try to get the value as an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            CellValue::Bool(b) => Some(i64::from(*b)),
            CellValue::String(s) => s.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }

    /// Try to get the value as a float
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }

    /// Try to get the value as a calendar day
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_date_text(s),
            _ => None,
        }
    }

    /// Get the value as a string.
    ///
    /// Integral floats render without a fractional part, so an identifier
    /// stored as the number `123.0` becomes `"123"`.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Date(d) => format_date(*d),
            CellValue::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_keeps_identifier_text() {
        assert_eq!(CellValue::from("007").as_str(), "007");
        assert_eq!(CellValue::Float(123.0).as_str(), "123");
        assert_eq!(CellValue::Int(5).as_str(), "5");
        assert_eq!(CellValue::Null.as_str(), "");
    }

    #[test]
    fn test_date_values() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(CellValue::Date(day).as_str(), "2024-01-02");
        assert_eq!(CellValue::from("2024-01-02").as_date(), Some(day));
        assert_eq!(CellValue::Int(3).as_date(), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Int(42).as_float(), Some(42.0));
        assert_eq!(CellValue::Float(3.9).as_int(), Some(3));
        assert_eq!(CellValue::Bool(true).as_int(), Some(1));
        assert!(CellValue::Float(1.0).is_number());
        assert!(!CellValue::from("1").is_number());
        assert_eq!(CellValue::default(), CellValue::Null);
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
    }
}
