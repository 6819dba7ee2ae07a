//! Sheet/Book module for agentkpi
//!
//! Provides the in-memory tabular model the KPI pipeline runs on: typed
//! cells, sheets with named columns, ordered books of sheets, and xlsx/CSV
//! import and export.
//!
//! # Examples
//!
//! ## Creating a sheet with named columns
//!
//! ```
//! use agentkpi_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_columns(
//!     "CHO",
//!     &["date", "agentmis", "status"],
//!     vec![vec![
//!         CellValue::from("2024-01-01"),
//!         CellValue::from("A1"),
//!         CellValue::from("No Show"),
//!     ]],
//! )
//! .unwrap();
//!
//! assert_eq!(sheet.record_count(), 1);
//! assert_eq!(sheet.get_by_name(1, "status").unwrap().as_str(), "No Show");
//! ```
//!
//! ## Grouping and joining
//!
//! ```
//! use agentkpi_sheet::Sheet;
//!
//! let mut left = Sheet::from_data(vec![vec!["agent"], vec!["a"], vec!["b"]]);
//! left.name_columns_by_row(0).unwrap();
//! let mut right = Sheet::from_data(vec![vec!["agent", "calls"], vec!["a", "3"]]);
//! right.name_columns_by_row(0).unwrap();
//!
//! let joined = left.left_join(&right, &["agent"]).unwrap();
//! assert_eq!(joined.record_count(), 2);
//! assert!(joined.get_by_name(2, "calls").unwrap().is_null());
//! ```
//!
//! ## Working with workbooks
//!
//! ```no_run
//! use agentkpi_sheet::{Book, XlsxReadOptions};
//!
//! let bytes = std::fs::read("input.xlsx").unwrap();
//! let book = Book::from_xlsx_bytes(&bytes, &XlsxReadOptions::default().with_headers(true)).unwrap();
//! ```

mod book;
mod cell;
mod csv;
pub mod datetime;
mod error;
mod record_batch;
mod sheet;
mod types;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet types.
pub use sheet::{RowGroup, Sheet};
/// Re-export column type inference.
pub use types::ColumnType;
/// Re-export XLSX read options.
pub use xlsx::XlsxReadOptions;
