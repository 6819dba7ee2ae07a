//! Per-sheet aggregation.
//!
//! Every source sheet is reduced by one generic step driven by a list of
//! [`MetricSpec`]s. Rows are grouped by (date, agentmis) and each metric
//! folds the group's cells of one source column with a [`Reducer`].

use crate::error::{PipelineError, Result};
use crate::source::{SourceSheet, KEY_COLUMNS};
use agentkpi_sheet::{CellValue, Sheet};
use tracing::debug;

/// Test applied to the text form of a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Case-insensitive equality. Null never matches.
    EqualsIgnoreCase(&'static str),
    /// Case-insensitive inequality. Null always matches.
    NotEqualsIgnoreCase(&'static str),
}

impl Predicate {
    #[must_use]
    pub fn matches(self, cell: &CellValue) -> bool {
        let text = cell.as_str();
        match self {
            Predicate::EqualsIgnoreCase(expected) => text.to_lowercase() == expected,
            Predicate::NotEqualsIgnoreCase(expected) => text.to_lowercase() != expected,
        }
    }
}

/// How a group's cells are folded into one metric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reducer {
    /// Number of non-null cells
    Count,
    /// Sum of numeric cells; nulls are skipped
    Sum,
    /// Number of cells satisfying a predicate
    CountWhere(Predicate),
    /// Number of numeric cells equal to one of the values.
    ///
    /// Yields 0 for every group when the column as a whole is not numeric.
    CountNumericIn(&'static [f64]),
}

/// One output column of an aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub output: &'static str,
    pub source: &'static str,
    pub reducer: Reducer,
}

const fn metric(output: &'static str, source: &'static str, reducer: Reducer) -> MetricSpec {
    MetricSpec {
        output,
        source,
        reducer,
    }
}

const ATTENDANCE: [MetricSpec; 2] = [
    metric("absent", "status", Reducer::CountWhere(Predicate::EqualsIgnoreCase("no show"))),
    metric("scheduled", "status", Reducer::CountWhere(Predicate::NotEqualsIgnoreCase("off"))),
];

const CALL_HANDLING: [MetricSpec; 3] = [
    metric("ans_vol", "ans_vol", Reducer::Sum),
    metric("aht_min", "aht", Reducer::Sum),
    metric("art_min", "art", Reducer::Sum),
];

const SATISFACTION: [MetricSpec; 5] = [
    metric("surveyed_count", "score", Reducer::Count),
    metric("solved_count", "sloved", Reducer::CountWhere(Predicate::EqualsIgnoreCase("yes"))),
    metric(
        "not_solved_count",
        "sloved",
        Reducer::CountWhere(Predicate::NotEqualsIgnoreCase("yes")),
    ),
    metric("csat_count", "score", Reducer::CountNumericIn(&[4.0, 5.0])),
    metric("dsat_count", "score", Reducer::CountNumericIn(&[1.0])),
];

const FAIL: Predicate = Predicate::EqualsIgnoreCase("fail");

const EVALUATION: [MetricSpec; 8] = [
    metric("evaluated_count", "final", Reducer::Count),
    metric("pass_eval_count", "final", Reducer::CountWhere(Predicate::EqualsIgnoreCase("pass"))),
    metric("fail_eval_count", "final", Reducer::CountWhere(FAIL)),
    metric("rc1_fail", "rc1", Reducer::CountWhere(FAIL)),
    metric("rc2_fail", "rc2", Reducer::CountWhere(FAIL)),
    metric("rc_fail", "rc", Reducer::CountWhere(FAIL)),
    metric("bc_fail", "bc", Reducer::CountWhere(FAIL)),
    metric("cc_fail", "cc", Reducer::CountWhere(FAIL)),
];

/// Metric set computed for a source sheet, in output column order
#[must_use]
pub fn metrics(source: SourceSheet) -> &'static [MetricSpec] {
    match source {
        SourceSheet::Attendance => &ATTENDANCE,
        SourceSheet::CallHandling => &CALL_HANDLING,
        SourceSheet::Satisfaction => &SATISFACTION,
        SourceSheet::Evaluation => &EVALUATION,
    }
}

/// A metric bound to the column it reads
struct BoundMetric {
    sheet: &'static str,
    spec: MetricSpec,
    column: usize,
    numeric_column: bool,
}

impl BoundMetric {
    fn reduce(&self, sheet: &Sheet, rows: &[usize]) -> Result<CellValue> {
        let cells = rows
            .iter()
            .filter_map(|&r| sheet.data().get(r).and_then(|row| row.get(self.column)));

        let value = match self.spec.reducer {
            Reducer::Count => CellValue::Int(count(cells.filter(|c| !c.is_null()))),
            Reducer::CountWhere(pred) => CellValue::Int(count(cells.filter(|c| pred.matches(c)))),
            Reducer::CountNumericIn(values) => {
                if self.numeric_column {
                    CellValue::Int(count(cells.filter(|c| {
                        c.is_number() && c.as_float().is_some_and(|v| values.contains(&v))
                    })))
                } else {
                    CellValue::Int(0)
                }
            }
            Reducer::Sum => {
                let mut total = 0.0;
                for cell in cells {
                    match cell {
                        CellValue::Null => {}
                        CellValue::Int(i) => total += *i as f64,
                        CellValue::Float(f) => total += f,
                        other => {
                            return Err(PipelineError::TypeMismatch {
                                sheet: self.sheet.to_string(),
                                column: self.spec.source.to_string(),
                                value: other.as_str(),
                            })
                        }
                    }
                }
                CellValue::Float(total)
            }
        };
        Ok(value)
    }
}

fn count<'a>(cells: impl Iterator<Item = &'a CellValue>) -> i64 {
    cells.count() as i64
}

/// Group a normalized source sheet by (date, agentmis) and compute its metrics.
///
/// The result has the key columns followed by the source's metric columns,
/// with one row per distinct key in first-appearance order.
pub fn aggregate(sheet: &Sheet, source: SourceSheet) -> Result<Sheet> {
    let name = source.sheet_name();
    let specs = metrics(source);

    let bound = specs
        .iter()
        .map(|spec| {
            let column = sheet
                .column_names()
                .and_then(|names| names.iter().position(|n| n == spec.source))
                .ok_or_else(|| PipelineError::MissingColumn {
                    sheet: name.to_string(),
                    column: spec.source.to_string(),
                })?;
            let numeric_column = match spec.reducer {
                Reducer::CountNumericIn(_) => sheet
                    .column_type(spec.source)
                    .map_err(PipelineError::in_sheet(name))?
                    .is_numeric(),
                _ => true,
            };
            Ok(BoundMetric {
                sheet: name,
                spec: *spec,
                column,
                numeric_column,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let groups = sheet
        .group_rows_by(&KEY_COLUMNS)
        .map_err(PipelineError::in_sheet(name))?;

    let mut rows = Vec::with_capacity(groups.len());
    for group in groups {
        let mut row = group.key;
        for metric in &bound {
            row.push(metric.reduce(sheet, &group.rows)?);
        }
        rows.push(row);
    }

    let columns: Vec<&str> = KEY_COLUMNS
        .iter()
        .copied()
        .chain(specs.iter().map(|s| s.output))
        .collect();
    let result = Sheet::from_columns(name, &columns, rows)?;
    debug!(sheet = name, groups = result.record_count(), "aggregated sheet");
    Ok(result)
}
