use crate::error::{PipelineError, Result};
use crate::source::{SourceSheet, KEY_COLUMNS};
use agentkpi_sheet::{CellValue, Sheet};
use tracing::debug;

/// Left-join each aggregate onto the base table and zero-fill the metrics.
///
/// `aggregates` must be in [`SourceSheet::ALL`] order. Every base row is
/// kept; metric columns follow the key columns in join order.
pub fn consolidate(base: &Sheet, aggregates: &[(SourceSheet, Sheet)]) -> Result<Sheet> {
    let mut table = base.clone();
    for (source, aggregate) in aggregates {
        table = table
            .left_join(aggregate, &KEY_COLUMNS)
            .map_err(PipelineError::in_sheet(source.sheet_name()))?;
    }

    let metric_columns: Vec<String> = table
        .column_names()
        .map(|names| {
            names
                .iter()
                .filter(|n| !KEY_COLUMNS.contains(&n.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    let metric_refs: Vec<&str> = metric_columns.iter().map(String::as_str).collect();

    let filled = table.fill_nulls(&metric_refs, &CellValue::Int(0))?;
    debug!(
        records = table.record_count(),
        metrics = metric_refs.len(),
        filled,
        "consolidated KPI table"
    );
    Ok(table)
}
