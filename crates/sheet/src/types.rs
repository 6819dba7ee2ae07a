use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;

/// Declared type of a column, inferred from its non-null cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every cell is null (or the column has no rows)
    Null,
    Boolean,
    Integer,
    /// Numbers, at least one of them fractional-typed
    Float,
    Date,
    Text,
    /// Incompatible kinds share the column
    Mixed,
}

impl ColumnType {
    /// Whether the column holds numbers only.
    ///
    /// Null-only columns count as numeric, matching how spreadsheet readers
    /// type an empty column as a float column.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Null | ColumnType::Integer | ColumnType::Float)
    }

    fn of(cell: &CellValue) -> ColumnType {
        match cell {
            CellValue::Null => ColumnType::Null,
            CellValue::Bool(_) => ColumnType::Boolean,
            CellValue::Int(_) => ColumnType::Integer,
            CellValue::Float(_) => ColumnType::Float,
            CellValue::Date(_) => ColumnType::Date,
            CellValue::String(_) => ColumnType::Text,
        }
    }

    fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::{Float, Integer, Mixed, Null};
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Mixed,
        }
    }

    /// Infer the type of a sequence of cells
    pub fn infer<'a, I>(cells: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        cells
            .into_iter()
            .fold(ColumnType::Null, |acc, cell| acc.widen(ColumnType::of(cell)))
    }
}

impl Sheet {
    /// Infer the declared type of a named column from its data cells
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(ColumnType::infer(self.column_values(name)?))
    }
}
