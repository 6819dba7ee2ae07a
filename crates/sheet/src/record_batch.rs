//! Arrow conversion for Sheet
//!
//! Converts named-column sheets into Arrow record batches so they can be
//! handed to Arrow tooling such as the pretty table printer.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use crate::types::ColumnType;
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use std::sync::Arc;

fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Date => DataType::Date32,
        // Empty, text and mixed columns are rendered as strings
        ColumnType::Null | ColumnType::Text | ColumnType::Mixed => DataType::Utf8,
    }
}

fn days_since_epoch(date: NaiveDate) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from((date - epoch).num_days()).ok()
}

/// Build an Arrow array from column data
fn build_arrow_array(rows: &[&Vec<CellValue>], col_idx: usize, dtype: &DataType) -> ArrayRef {
    match dtype {
        DataType::Boolean => {
            let values: Vec<Option<bool>> = rows
                .iter()
                .map(|row| row.get(col_idx).and_then(CellValue::as_bool))
                .collect();
            Arc::new(BooleanArray::from(values))
        }
        DataType::Int64 => {
            let values: Vec<Option<i64>> = rows
                .iter()
                .map(|row| row.get(col_idx).and_then(CellValue::as_int))
                .collect();
            Arc::new(Int64Array::from(values))
        }
        DataType::Float64 => {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|row| row.get(col_idx).and_then(CellValue::as_float))
                .collect();
            Arc::new(Float64Array::from(values))
        }
        DataType::Date32 => {
            let values: Vec<Option<i32>> = rows
                .iter()
                .map(|row| {
                    row.get(col_idx)
                        .and_then(CellValue::as_date)
                        .and_then(days_since_epoch)
                })
                .collect();
            Arc::new(Date32Array::from(values))
        }
        _ => {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|row| {
                    row.get(col_idx)
                        .filter(|cell| !cell.is_null())
                        .map(CellValue::as_str)
                })
                .collect();
            Arc::new(StringArray::from(values))
        }
    }
}

impl Sheet {
    /// Convert the sheet's data rows into an Arrow record batch.
    ///
    /// Column types are inferred per column; requires named columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let column_names = self.column_names().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Columns must be named to convert to Arrow".to_string())
        })?;

        let rows: Vec<&Vec<CellValue>> = self.records().collect();
        let col_types: Vec<DataType> = (0..column_names.len())
            .map(|col_idx| {
                arrow_type(ColumnType::infer(
                    rows.iter().filter_map(|row| row.get(col_idx)),
                ))
            })
            .collect();

        let fields: Vec<Field> = column_names
            .iter()
            .zip(&col_types)
            .map(|(name, dtype)| Field::new(name, dtype.clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let arrays: Vec<ArrayRef> = col_types
            .iter()
            .enumerate()
            .map(|(col_idx, dtype)| build_arrow_array(&rows, col_idx, dtype))
            .collect();

        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}
