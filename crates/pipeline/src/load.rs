//! Loading and normalizing the four source sheets.

use crate::error::{PipelineError, Result};
use crate::source::{SourceSheet, AGENT_COLUMN, DATE_COLUMN};
use agentkpi_sheet::datetime::{excel_serial_to_date, parse_date_text};
use agentkpi_sheet::{Book, CellValue, Sheet};
use std::collections::HashSet;
use tracing::debug;

/// The four normalized source sheets
#[derive(Debug, Clone)]
pub struct SourceSheets {
    attendance: Sheet,
    call_handling: Sheet,
    satisfaction: Sheet,
    evaluation: Sheet,
}

impl SourceSheets {
    #[cfg(test)]
    pub(crate) fn from_sheets(
        attendance: Sheet,
        call_handling: Sheet,
        satisfaction: Sheet,
        evaluation: Sheet,
    ) -> Self {
        SourceSheets {
            attendance,
            call_handling,
            satisfaction,
            evaluation,
        }
    }

    /// Get the normalized sheet for a source
    #[must_use]
    pub fn get(&self, source: SourceSheet) -> &Sheet {
        match source {
            SourceSheet::Attendance => &self.attendance,
            SourceSheet::CallHandling => &self.call_handling,
            SourceSheet::Satisfaction => &self.satisfaction,
            SourceSheet::Evaluation => &self.evaluation,
        }
    }

    /// Iterate sources in base-building order
    pub fn iter(&self) -> impl Iterator<Item = (SourceSheet, &Sheet)> {
        SourceSheet::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Data-row count of a source sheet
    #[must_use]
    pub fn row_count(&self, source: SourceSheet) -> usize {
        self.get(source).record_count()
    }
}

/// Canonical form of a column header
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Coerce a date cell to a calendar day
fn coerce_date(cell: &CellValue) -> Option<CellValue> {
    let date = match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_date_text(s),
        CellValue::Int(i) => excel_serial_to_date(*i as f64),
        CellValue::Float(f) => excel_serial_to_date(*f),
        CellValue::Null | CellValue::Bool(_) => None,
    };
    date.map(CellValue::Date)
}

/// Coerce an agent-identifier cell to text
fn coerce_agent(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::String(_) => cell.clone(),
        other => CellValue::String(other.as_str()),
    }
}

/// Normalize one raw sheet for the given source.
///
/// Lower-cases and trims headers, checks the required columns, parses the
/// date column, drops fully blank rows and forces agent identifiers to text.
pub fn normalize_sheet(mut sheet: Sheet, source: SourceSheet) -> Result<Sheet> {
    let name = source.sheet_name();

    if sheet.column_names().is_none() && !sheet.is_empty() {
        sheet.name_columns_by_row(0).map_err(PipelineError::in_sheet(name))?;
    }
    if sheet.column_names().is_some() {
        sheet
            .rename_columns(normalize_column_name)
            .map_err(PipelineError::in_sheet(name))?;
    }

    for column in source.required_columns() {
        if !sheet.has_column(column) {
            return Err(PipelineError::MissingColumn {
                sheet: name.to_string(),
                column: (*column).to_string(),
            });
        }
    }

    let blank_rows: HashSet<usize> = sheet
        .data()
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().all(CellValue::is_null))
        .map(|(idx, _)| idx)
        .collect();

    sheet.try_column_map_by_name(DATE_COLUMN, |row_idx, cell| {
        if blank_rows.contains(&row_idx) {
            return Ok(CellValue::Null);
        }
        coerce_date(cell).ok_or_else(|| PipelineError::DateParse {
            sheet: name.to_string(),
            // Spreadsheet rows are 1-based and the header occupies row 1
            row: row_idx + 1,
            value: cell.as_str(),
        })
    })?;

    let dropped = sheet.remove_empty_rows();
    sheet.try_column_map_by_name(AGENT_COLUMN, |_, cell| {
        Ok::<_, PipelineError>(coerce_agent(cell))
    })?;

    debug!(
        sheet = name,
        rows = sheet.record_count(),
        dropped,
        "normalized sheet"
    );
    Ok(sheet)
}

/// Take the four source sheets out of a workbook and normalize them
pub fn load_sources(mut book: Book) -> Result<SourceSheets> {
    let mut take = |source: SourceSheet| -> Result<Sheet> {
        let sheet = book.remove_sheet(source.sheet_name())?;
        normalize_sheet(sheet, source)
    };

    Ok(SourceSheets {
        attendance: take(SourceSheet::Attendance)?,
        call_handling: take(SourceSheet::CallHandling)?,
        satisfaction: take(SourceSheet::Satisfaction)?,
        evaluation: take(SourceSheet::Evaluation)?,
    })
}
