//! Base-key table: the union of (date, agent) pairs across all sources.

use crate::error::{PipelineError, Result};
use crate::load::SourceSheets;
use crate::source::{AGENT_COLUMN, DATE_COLUMN, KEY_COLUMNS};
use crate::stats::DateRange;
use agentkpi_sheet::{CellValue, Sheet};
use std::collections::HashSet;
use tracing::debug;

/// Figures describing the base table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSummary {
    pub total_records: usize,
    pub unique_agents: usize,
    pub date_range: Option<DateRange>,
}

/// Build the deduplicated (date, agentmis) table.
///
/// Keys are concatenated in source order and the first occurrence of each
/// pair is kept, so identical input always yields the same row order.
pub fn build_base(sources: &SourceSheets) -> Result<Sheet> {
    let mut base = Sheet::from_columns("KPI", &KEY_COLUMNS, Vec::new())?;

    for (source, sheet) in sources.iter() {
        let mut keys = sheet.clone();
        keys.select_columns(&KEY_COLUMNS)
            .map_err(PipelineError::in_sheet(source.sheet_name()))?;
        base.append(&keys)?;
    }

    let removed = base.remove_duplicates_by_columns(&KEY_COLUMNS)?;
    debug!(records = base.record_count(), removed, "built base table");
    Ok(base)
}

/// Count distinct agents and find the date span of a base table
pub fn summarize_base(base: &Sheet) -> Result<BaseSummary> {
    let agents: HashSet<String> = base
        .column_values(AGENT_COLUMN)?
        .into_iter()
        .map(CellValue::as_str)
        .collect();

    let dates: Vec<_> = base
        .column_values(DATE_COLUMN)?
        .into_iter()
        .filter_map(CellValue::as_date)
        .collect();
    let date_range = dates
        .iter()
        .min()
        .zip(dates.iter().max())
        .map(|(start, end)| DateRange {
            start: *start,
            end: *end,
        });

    Ok(BaseSummary {
        total_records: base.record_count(),
        unique_agents: agents.len(),
        date_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::normalize_sheet;
    use crate::source::SourceSheet;
    use chrono::NaiveDate;

    fn source(source: SourceSheet, keys: &[(&str, &str)]) -> Sheet {
        let cols = source.required_columns();
        let rows = keys
            .iter()
            .map(|(d, a)| {
                let mut row = vec![CellValue::from(*d), CellValue::from(*a)];
                row.resize(cols.len(), CellValue::Null);
                row
            })
            .collect();
        let sheet = Sheet::from_columns(source.sheet_name(), cols, rows).unwrap();
        normalize_sheet(sheet, source).unwrap()
    }

    fn sources(
        cho: &[(&str, &str)],
        cht: &[(&str, &str)],
        chd: &[(&str, &str)],
        che: &[(&str, &str)],
    ) -> SourceSheets {
        SourceSheets::from_sheets(
            source(SourceSheet::Attendance, cho),
            source(SourceSheet::CallHandling, cht),
            source(SourceSheet::Satisfaction, chd),
            source(SourceSheet::Evaluation, che),
        )
    }

    #[test]
    fn test_union_not_sum() {
        let s = sources(
            &[("2024-01-01", "A1"), ("2024-01-01", "A1")],
            &[("2024-01-01", "A1"), ("2024-01-02", "A1")],
            &[("2024-01-01", "B2")],
            &[],
        );
        let base = build_base(&s).unwrap();
        assert_eq!(base.record_count(), 3);
        assert_eq!(base.column_names().unwrap(), &vec!["date", "agentmis"]);

        // First occurrence order: CHO, then CHT, then CHD
        assert_eq!(base.get_by_name(1, "agentmis").unwrap().as_str(), "A1");
        assert_eq!(base.get_by_name(2, "date").unwrap().as_str(), "2024-01-02");
        assert_eq!(base.get_by_name(3, "agentmis").unwrap().as_str(), "B2");
    }

    #[test]
    fn test_summary() {
        let s = sources(
            &[("2024-01-03", "A1")],
            &[("2024-01-01", "A2")],
            &[],
            &[("2024-01-02", "A1")],
        );
        let summary = summarize_base(&build_base(&s).unwrap()).unwrap();
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.unique_agents, 2);
        assert_eq!(
            summary.date_range,
            Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            })
        );
    }

    #[test]
    fn test_empty_sources() {
        let s = sources(&[], &[], &[], &[]);
        let base = build_base(&s).unwrap();
        assert_eq!(base.record_count(), 0);
        assert!(base.has_column("agentmis"));

        let summary = summarize_base(&base).unwrap();
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.unique_agents, 0);
        assert_eq!(summary.date_range, None);
    }
}
