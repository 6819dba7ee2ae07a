use crate::source::SourceSheet;
use agentkpi_sheet::datetime::format_date;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// Inclusive span of dates covered by the base table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_date(self.start), format_date(self.end))
    }
}

impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub cho_rows: usize,
    pub cht_rows: usize,
    pub chd_rows: usize,
    pub che_rows: usize,
    /// Rows in the base table (distinct date/agent pairs)
    pub total_records: usize,
    pub unique_agents: usize,
    /// `None` when the workbook holds no records
    pub date_range: Option<DateRange>,
}

impl Statistics {
    /// Data-row count recorded for a source sheet
    #[must_use]
    pub fn source_rows(&self, source: SourceSheet) -> usize {
        match source {
            SourceSheet::Attendance => self.cho_rows,
            SourceSheet::CallHandling => self.cht_rows,
            SourceSheet::Satisfaction => self.chd_rows,
            SourceSheet::Evaluation => self.che_rows,
        }
    }

    /// Human-readable date range, `-` when there is none
    #[must_use]
    pub fn date_range_label(&self) -> String {
        self.date_range
            .map_or_else(|| "-".to_string(), |range| range.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Statistics {
        Statistics {
            cho_rows: 3,
            cht_rows: 2,
            chd_rows: 1,
            che_rows: 0,
            total_records: 4,
            unique_agents: 2,
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            }),
        }
    }

    #[test]
    fn test_date_range_format() {
        assert_eq!(stats().date_range_label(), "2024-01-01 to 2024-01-31");
        let empty = Statistics {
            date_range: None,
            ..stats()
        };
        assert_eq!(empty.date_range_label(), "-");
    }

    #[test]
    fn test_serializes_range_as_text() {
        let json = serde_json::to_value(stats()).unwrap();
        assert_eq!(json["date_range"], "2024-01-01 to 2024-01-31");
        assert_eq!(json["cho_rows"], 3);
        assert_eq!(stats().source_rows(SourceSheet::CallHandling), 2);
    }
}
