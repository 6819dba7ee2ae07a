use crate::book::Book;
use crate::cell::CellValue;
use crate::datetime::{date_to_excel_serial, excel_serial_to_date, parse_date_text};
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
    /// Load only these sheets (all sheets when `None`)
    pub sheets: Option<Vec<String>>,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Restrict loading to the named sheets
    #[must_use]
    pub fn only_sheets<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.sheets = Some(names.iter().map(|n| n.as_ref().to_string()).collect());
        self
    }
}

fn workbook_error(e: impl ToString) -> SheetError {
    SheetError::Workbook(e.to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial).map_or(CellValue::Float(serial), CellValue::Date)
        }
        Data::DateTimeIso(s) => parse_date_text(s).map_or_else(|| CellValue::String(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn read_sheet<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    sheet_name: &str,
    options: &XlsxReadOptions,
) -> Result<Sheet> {
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e: XlsxError| workbook_error(e))?;

    let data: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(data_to_cell_value).collect())
        .collect();

    let mut sheet = Sheet::with_name(sheet_name);
    *sheet.data_mut() = data;

    if options.has_headers && sheet.row_count() > 0 {
        sheet.name_columns_by_row(0)?;
    }

    Ok(sheet)
}

impl Book {
    /// Load a book from any seekable reader holding an xlsx workbook
    ///
    /// # Errors
    ///
    /// Returns error if the workbook is unreadable or a requested sheet is missing.
    pub fn from_xlsx_reader<R: Read + Seek>(reader: R, options: &XlsxReadOptions) -> Result<Self> {
        let mut workbook: Xlsx<R> =
            open_workbook_from_rs(reader).map_err(|e: XlsxError| workbook_error(e))?;

        let available: Vec<String> = workbook.sheet_names().iter().map(|s| s.to_string()).collect();
        let wanted: Vec<String> = match &options.sheets {
            Some(names) => names.clone(),
            None => available.clone(),
        };

        let mut book = Book::new();
        for sheet_name in wanted {
            if !available.contains(&sheet_name) {
                return Err(SheetError::SheetNotFound { name: sheet_name });
            }
            let sheet = read_sheet(&mut workbook, &sheet_name, options)?;
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }

    /// Load a book from in-memory xlsx bytes
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a readable workbook.
    pub fn from_xlsx_bytes(bytes: &[u8], options: &XlsxReadOptions) -> Result<Self> {
        Self::from_xlsx_reader(Cursor::new(bytes), options)
    }

    /// Load a book from an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P, options: &XlsxReadOptions) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_xlsx_bytes(&bytes, options)
    }

    /// Get sheet names from in-memory xlsx bytes without loading cell data
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a readable workbook.
    pub fn xlsx_sheet_names(bytes: &[u8]) -> Result<Vec<String>> {
        let workbook: Xlsx<Cursor<&[u8]>> =
            open_workbook_from_rs(Cursor::new(bytes)).map_err(|e: XlsxError| workbook_error(e))?;

        Ok(workbook.sheet_names().iter().map(|s| s.to_string()).collect())
    }

    /// Save the book to an xlsx buffer, one worksheet per sheet
    ///
    /// # Errors
    ///
    /// Returns error if a sheet name is rejected or the workbook cannot be serialized.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(workbook_error)?;
            sheet.write_to_worksheet(worksheet)?;
        }
        workbook.save_to_buffer().map_err(workbook_error)
    }
}

impl Sheet {
    /// Save the sheet to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.name()).map_err(workbook_error)?;
        self.write_to_worksheet(worksheet)?;

        workbook.save(path.as_ref()).map_err(workbook_error)
    }

    /// Serialize the sheet as a single-worksheet xlsx buffer
    ///
    /// # Errors
    ///
    /// Returns error if the workbook cannot be serialized.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.name()).map_err(workbook_error)?;
        self.write_to_worksheet(worksheet)?;

        workbook.save_to_buffer().map_err(workbook_error)
    }

    /// Write sheet data to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let header_format = Format::new().set_bold();
        let has_header = self.column_names().is_some();

        for (row_idx, row) in self.data().iter().enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| workbook_error("Row index overflow"))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num =
                    u16::try_from(col_idx).map_err(|_| workbook_error("Column index overflow"))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::String(s) if has_header && row_idx == 0 => {
                        worksheet
                            .write_string_with_format(row_num, col_num, s, &header_format)
                            .map_err(workbook_error)?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(workbook_error)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(row_num, col_num, *b)
                            .map_err(workbook_error)?;
                    }
                    CellValue::Int(i) => {
                        // Excel stores all numbers as f64
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(workbook_error)?;
                    }
                    CellValue::Float(f) => {
                        worksheet
                            .write_number(row_num, col_num, *f)
                            .map_err(workbook_error)?;
                    }
                    CellValue::Date(d) => {
                        worksheet
                            .write_number_with_format(
                                row_num,
                                col_num,
                                date_to_excel_serial(*d),
                                &date_format,
                            )
                            .map_err(workbook_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_sheet() -> Sheet {
        Sheet::from_columns(
            "KPI",
            &["date", "agentmis", "absent"],
            vec![vec![
                CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                CellValue::from("007"),
                CellValue::Int(1),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn test_sheet_bytes_roundtrip_keeps_dates_and_text_ids() {
        let bytes = sample_sheet().to_xlsx_bytes().unwrap();
        let book = Book::from_xlsx_bytes(&bytes, &XlsxReadOptions::default().with_headers(true))
            .unwrap();

        let sheet = book.get_sheet("KPI").unwrap();
        assert_eq!(
            sheet.get_by_name(1, "date").unwrap(),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(sheet.get_by_name(1, "agentmis").unwrap().as_str(), "007");
        // Int becomes Float in Excel
        assert_eq!(sheet.get_by_name(1, "absent").unwrap().as_float(), Some(1.0));
    }

    #[test]
    fn test_save_as_xlsx_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kpi.xlsx");
        sample_sheet().save_as_xlsx(&path).unwrap();

        let book = Book::from_xlsx(&path, &XlsxReadOptions::default()).unwrap();
        assert_eq!(book.sheet_names(), vec!["KPI"]);
        assert!(book.get_sheet("KPI").unwrap().column_names().is_none());
    }

    #[test]
    fn test_book_sheet_names_and_filter() {
        let mut book = Book::new();
        book.add_sheet("First", Sheet::from_data(vec![vec!["a"]])).unwrap();
        book.add_sheet("Second", Sheet::from_data(vec![vec!["b"]])).unwrap();
        let bytes = book.to_xlsx_bytes().unwrap();

        assert_eq!(Book::xlsx_sheet_names(&bytes).unwrap(), vec!["First", "Second"]);

        let only = Book::from_xlsx_bytes(&bytes, &XlsxReadOptions::default().only_sheets(&["Second"]))
            .unwrap();
        assert_eq!(only.sheet_names(), vec!["Second"]);

        let missing = Book::from_xlsx_bytes(&bytes, &XlsxReadOptions::default().only_sheets(&["Third"]));
        assert!(matches!(missing, Err(SheetError::SheetNotFound { name }) if name == "Third"));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let err = Book::from_xlsx_bytes(b"not a workbook", &XlsxReadOptions::default());
        assert!(matches!(err, Err(SheetError::Workbook(_))));
    }
}
