//! Daily agent KPI pipeline.
//!
//! Turns a call-center workbook with the sheets `CHO` (attendance), `CHT`
//! (call handling), `CHD` (satisfaction surveys) and `CHE` (quality
//! evaluations) into one table with a row per (date, agent) pair.
//!
//! The run is a fixed sequence of stages:
//!
//! 1. validate that the four sheets exist ([`validate_sheet_names`])
//! 2. load and normalize each sheet ([`load_sources`])
//! 3. build the base table of distinct keys ([`build_base`])
//! 4. aggregate each sheet by key ([`aggregate`])
//! 5. left-join the aggregates onto the base and zero-fill ([`consolidate`])
//!
//! # Example
//!
//! ```no_run
//! let bytes = std::fs::read("operations.xlsx").unwrap();
//! let (table, stats) = agentkpi_pipeline::build_db(&bytes).unwrap();
//! println!("{} records, {} agents", stats.total_records, stats.unique_agents);
//! table.save_as_xlsx("daily_agent_db.xlsx").unwrap();
//! ```

mod aggregate;
mod base;
mod consolidate;
mod error;
mod load;
mod source;
mod stats;
mod table;
mod validate;

pub use aggregate::{aggregate, metrics, MetricSpec, Predicate, Reducer};
pub use base::{build_base, summarize_base, BaseSummary};
pub use consolidate::consolidate;
pub use error::{ErrorKind, PipelineError, Result};
pub use load::{load_sources, normalize_column_name, normalize_sheet, SourceSheets};
pub use source::{SourceSheet, AGENT_COLUMN, DATE_COLUMN, KEY_COLUMNS};
pub use stats::{DateRange, Statistics};
pub use table::{KpiTable, KPI_SHEET_NAME};
pub use validate::validate_sheet_names;

use agentkpi_sheet::{Book, XlsxReadOptions};
use tracing::{debug, info, info_span};

/// Run the whole pipeline over xlsx workbook bytes.
///
/// Sheet names are checked before any cell data is read, so a workbook
/// missing required sheets fails fast with [`PipelineError::MissingSheets`].
///
/// # Errors
///
/// Returns a validation error when required sheets are absent and a
/// processing error for unreadable workbooks, missing columns, unparseable
/// dates or non-numeric values in summed columns.
pub fn build_db(workbook: &[u8]) -> Result<(KpiTable, Statistics)> {
    let span = info_span!("build_db", bytes = workbook.len());
    let _guard = span.enter();

    let names = Book::xlsx_sheet_names(workbook)?;
    validate_sheet_names(&names)?;

    let required: Vec<&str> = SourceSheet::ALL.iter().map(|s| s.sheet_name()).collect();
    let options = XlsxReadOptions::default().only_sheets(&required);
    let book = Book::from_xlsx_bytes(workbook, &options)?;

    build_db_from_book(book)
}

/// Run the pipeline over an already loaded workbook.
///
/// Sheets other than the four sources are ignored.
///
/// # Errors
///
/// Same as [`build_db`].
pub fn build_db_from_book(book: Book) -> Result<(KpiTable, Statistics)> {
    let names = book.sheet_names();
    validate_sheet_names(&names)?;
    debug!(sheets = book.sheet_count(), "workbook loaded");

    let sources = load_sources(book)?;
    let base = build_base(&sources)?;
    let summary = summarize_base(&base)?;

    let aggregates = sources
        .iter()
        .map(|(source, sheet)| Ok((source, aggregate(sheet, source)?)))
        .collect::<Result<Vec<_>>>()?;
    let table = KpiTable::new(consolidate(&base, &aggregates)?);

    let stats = Statistics {
        cho_rows: sources.row_count(SourceSheet::Attendance),
        cht_rows: sources.row_count(SourceSheet::CallHandling),
        chd_rows: sources.row_count(SourceSheet::Satisfaction),
        che_rows: sources.row_count(SourceSheet::Evaluation),
        total_records: summary.total_records,
        unique_agents: summary.unique_agents,
        date_range: summary.date_range,
    };

    info!(
        records = stats.total_records,
        agents = stats.unique_agents,
        date_range = %stats.date_range_label(),
        "built KPI table"
    );
    Ok((table, stats))
}
