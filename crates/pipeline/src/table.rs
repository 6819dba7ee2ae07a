use crate::error::Result;
use agentkpi_sheet::{CellValue, CsvOptions, Sheet};
use indexmap::IndexMap;
use std::path::Path;

/// Name of the worksheet the KPI table is exported as
pub const KPI_SHEET_NAME: &str = "KPI";

/// The final per-agent-per-day KPI table.
///
/// One row per distinct (date, agentmis) pair. Columns are the two key
/// columns followed by the attendance, call-handling, satisfaction and
/// evaluation metrics, none of which is ever null.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    sheet: Sheet,
}

impl KpiTable {
    pub(crate) fn new(mut sheet: Sheet) -> Self {
        sheet.set_name(KPI_SHEET_NAME);
        KpiTable { sheet }
    }

    /// Underlying sheet, header row included
    #[must_use]
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Column names in output order
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.sheet
            .column_names()
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of (date, agent) rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.sheet.record_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of a named column in a data row (0-based, header excluded)
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.sheet.get_by_name(row + 1, column).ok()
    }

    /// Find the row for a (date, agent) key, returned as column/value pairs
    #[must_use]
    pub fn find(&self, date: &str, agent: &str) -> Option<IndexMap<String, CellValue>> {
        self.records().into_iter().find(|record| {
            record.get("date").is_some_and(|d| d.as_str() == date)
                && record.get("agentmis").is_some_and(|a| a.as_str() == agent)
        })
    }

    /// Copy holding only the first `n` rows
    #[must_use]
    pub fn preview(&self, n: usize) -> KpiTable {
        KpiTable {
            sheet: self.sheet.head(n),
        }
    }

    /// Rows as ordered column/value maps
    #[must_use]
    pub fn records(&self) -> Vec<IndexMap<String, CellValue>> {
        self.sheet.to_records().unwrap_or_default()
    }

    /// Export as a single-worksheet xlsx buffer
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.sheet.to_xlsx_bytes()?)
    }

    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.sheet.save_as_xlsx(path)?)
    }

    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.sheet.save_as_csv(path, &CsvOptions::default())?)
    }

    #[must_use]
    pub fn to_csv_string(&self) -> String {
        self.sheet.to_csv_string()
    }
}
