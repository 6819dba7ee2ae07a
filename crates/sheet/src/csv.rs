use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Sheet {
    /// Save the sheet to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P, options: &CsvOptions) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file), options)
    }

    /// Write the sheet to a writer as CSV
    pub fn write_csv<W: Write>(&self, writer: W, options: &CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        for row in self.data() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the sheet to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_csv(&mut buffer, &CsvOptions::default());
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn kpi_sheet() -> Sheet {
        Sheet::from_columns(
            "KPI",
            &["date", "agentmis", "aht_min"],
            vec![vec![
                CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
                CellValue::from("00123"),
                CellValue::Float(4.5),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn test_to_csv_string() {
        assert_eq!(
            kpi_sheet().to_csv_string(),
            "date,agentmis,aht_min\n2024-01-02,00123,4.5\n"
        );
    }

    #[test]
    fn test_semicolon_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kpi.csv");
        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        kpi_sheet().save_as_csv(&path, &options).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("date;agentmis;aht_min\n"));
    }
}
