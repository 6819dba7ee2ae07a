use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Rows of a sheet that share the same values in a set of key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    /// Key cell values, in key-column order
    pub key: Vec<CellValue>,
    /// Indices into [`Sheet::data`] of the rows in this group
    pub rows: Vec<usize>,
}

/// A sheet representing a 2D grid of cells (row-major storage).
///
/// When columns are named, the header row stays at index 0 of the data and
/// all record-oriented operations skip it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet with named columns from a header and data rows
    pub fn from_columns(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut sheet = Sheet::with_name(name);
        sheet
            .data
            .push(columns.iter().map(|c| CellValue::from(*c)).collect());
        for row in rows {
            if row.len() != columns.len() {
                return Err(SheetError::LengthMismatch {
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            sheet.data.push(row);
        }
        sheet.name_columns_by_row(0)?;
        Ok(sheet)
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows, including the header row when present
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of data rows (the header row is not counted)
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.len().saturating_sub(self.data_start())
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.column_names
            .as_ref()
            .map_or_else(|| self.data.first().map_or(0, Vec::len), Vec::len)
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Remove data rows in which every cell is null. Returns the number removed.
    pub fn remove_empty_rows(&mut self) -> usize {
        let start = self.data_start();
        let before = self.data.len();
        let mut idx = 0usize;
        self.data.retain(|row| {
            let keep = idx < start || !row.iter().all(CellValue::is_null);
            idx += 1;
            keep
        });
        before - self.data.len()
    }

    /// Iterate over data rows (skipping the header row when columns are named)
    pub fn records(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter().skip(self.data_start())
    }

    /// Get all rows, including the header row
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable access to all rows.
    ///
    /// Callers replacing the header row should call
    /// [`Sheet::name_columns_by_row`] again afterwards.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    // ===== Column Operations =====

    /// Get the data values of a named column (the header cell is skipped)
    pub fn column_values(&self, name: &str) -> Result<Vec<&CellValue>> {
        let col = self.column_index_by_name(name)?;
        Ok(self
            .records()
            .map(|row| row.get(col).unwrap_or(&CellValue::Null))
            .collect())
    }

    /// Check whether a named column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index
            .as_ref()
            .is_some_and(|index| index.contains_key(name))
    }

    /// Replace every data cell of a named column with the result of `f`.
    ///
    /// `f` receives the row index (into [`Sheet::data`]) and the current value.
    pub fn try_column_map_by_name<F, E>(&mut self, name: &str, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(usize, &CellValue) -> std::result::Result<CellValue, E>,
        E: From<SheetError>,
    {
        let col = self.column_index_by_name(name)?;
        let start = self.data_start();
        for (row_idx, row) in self.data.iter_mut().enumerate().skip(start) {
            if let Some(cell) = row.get_mut(col) {
                *cell = f(row_idx, cell)?;
            }
        }
        Ok(())
    }

    /// Keep only the named columns, in the order given
    pub fn select_columns(&mut self, columns: &[&str]) -> Result<()> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|name| self.column_index_by_name(name))
            .collect::<Result<Vec<_>>>()?;

        for row in &mut self.data {
            let new_row: Vec<CellValue> = indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect();
            *row = new_row;
        }

        self.column_names = Some(columns.iter().map(|c| (*c).to_string()).collect());
        self.rebuild_column_index();
        Ok(())
    }

    // ===== Named Access =====

    /// Use the specified row as column headers
    ///
    /// Blank header cells are named `unnamed: <index>` after their position.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if the header row contains duplicate names.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?;
        let names: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell.as_str() {
                name if name.trim().is_empty() => format!("unnamed: {i}"),
                name => name,
            })
            .collect();

        let mut index_map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if index_map.contains_key(name) {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
            index_map.insert(name.clone(), i);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
        Ok(())
    }

    /// Rename every column with `f`, rewriting the header row in place.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if two columns map to the same name.
    pub fn rename_columns<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&str) -> String,
    {
        let names = self.column_names.as_ref().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
        })?;
        let renamed: Vec<String> = names.iter().map(|n| f(n.as_str())).collect();

        let mut seen = HashSet::new();
        for name in &renamed {
            if !seen.insert(name.as_str()) {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
        }

        if let Some(header) = self.data.first_mut() {
            for (cell, name) in header.iter_mut().zip(&renamed) {
                *cell = CellValue::String(name.clone());
            }
        }
        self.column_names = Some(renamed);
        self.rebuild_column_index();
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Get the column index by name
    fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn rebuild_column_index(&mut self) {
        if let Some(names) = &self.column_names {
            let mut index_map = HashMap::new();
            for (i, name) in names.iter().enumerate() {
                index_map.insert(name.clone(), i);
            }
            self.column_index = Some(index_map);
        }
    }

    fn data_start(&self) -> usize {
        usize::from(self.column_names.is_some() && !self.data.is_empty())
    }

    fn cell_key(cell: &CellValue) -> String {
        match cell {
            CellValue::Null => "N".to_string(),
            CellValue::Bool(b) => format!("B{b}"),
            CellValue::Int(i) => format!("I{i}"),
            CellValue::Float(f) => format!("F{f:?}"),
            CellValue::Date(d) => format!("D{d}"),
            CellValue::String(s) => format!("S{s}"),
        }
    }

    fn row_key(row: &[CellValue], indices: &[usize]) -> String {
        let mut key = String::new();
        for &col in indices {
            let cell = row.get(col).unwrap_or(&CellValue::Null);
            key.push_str(&Self::cell_key(cell));
            key.push('\x1f');
        }
        key
    }

    // ===== Data Quality =====

    /// Remove duplicate rows based on the provided column names.
    /// The first occurrence is kept. Returns the number of rows removed.
    pub fn remove_duplicates_by_columns(&mut self, columns: &[&str]) -> Result<usize> {
        let start_row = self.data_start();
        let indices: Vec<usize> = if columns.is_empty() {
            (0..self.col_count()).collect()
        } else {
            columns
                .iter()
                .map(|name| self.column_index_by_name(name))
                .collect::<Result<Vec<_>>>()?
        };

        let mut seen = HashSet::new();
        let mut new_data = Vec::with_capacity(self.data.len());
        let mut removed = 0usize;

        if start_row == 1 {
            new_data.push(self.data[0].clone());
        }

        for row in self.data.iter().skip(start_row) {
            if seen.insert(Self::row_key(row, &indices)) {
                new_data.push(row.clone());
            } else {
                removed += 1;
            }
        }

        self.data = new_data;
        Ok(removed)
    }

    /// Replace nulls in the named columns with `value`. Returns the number of cells filled.
    pub fn fill_nulls(&mut self, columns: &[&str], value: &CellValue) -> Result<usize> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|name| self.column_index_by_name(name))
            .collect::<Result<Vec<_>>>()?;

        let start = self.data_start();
        let mut filled = 0usize;
        for row in self.data.iter_mut().skip(start) {
            for &col in &indices {
                if let Some(cell) = row.get_mut(col) {
                    if cell.is_null() {
                        *cell = value.clone();
                        filled += 1;
                    }
                }
            }
        }
        Ok(filled)
    }

    // ===== Grouping =====

    /// Group data rows by the values of the given key columns.
    ///
    /// Groups are returned in order of first appearance.
    pub fn group_rows_by(&self, keys: &[&str]) -> Result<Vec<RowGroup>> {
        let indices: Vec<usize> = keys
            .iter()
            .map(|name| self.column_index_by_name(name))
            .collect::<Result<Vec<_>>>()?;

        let mut groups: IndexMap<String, RowGroup> = IndexMap::new();
        let start = self.data_start();
        for (row_idx, row) in self.data.iter().enumerate().skip(start) {
            groups
                .entry(Self::row_key(row, &indices))
                .or_insert_with(|| RowGroup {
                    key: indices
                        .iter()
                        .map(|&i| row.get(i).cloned().unwrap_or_default())
                        .collect(),
                    rows: Vec::new(),
                })
                .rows
                .push(row_idx);
        }

        Ok(groups.into_values().collect())
    }

    // ===== Append / Join =====

    /// Append all rows from another sheet (like SQL UNION ALL).
    ///
    /// Columns are aligned by name; columns missing from `other` are filled
    /// with Null and columns unknown to `self` are dropped.
    pub fn append(&mut self, other: &Sheet) -> Result<()> {
        if self.is_empty() {
            self.data.clone_from(&other.data);
            self.column_names.clone_from(&other.column_names);
            self.column_index.clone_from(&other.column_index);
            return Ok(());
        }

        let names = self.column_names.clone().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Cannot append without named columns".to_string())
        })?;
        if other.column_names.is_none() {
            return Err(SheetError::ColumnsNotNamed(format!(
                "Sheet '{}' has no named columns",
                other.name
            )));
        }

        let mapping: Vec<Option<usize>> = names
            .iter()
            .map(|n| other.column_index_by_name(n).ok())
            .collect();

        for row in other.records() {
            let new_row: Vec<CellValue> = mapping
                .iter()
                .map(|idx| idx.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                .collect();
            self.data.push(new_row);
        }
        Ok(())
    }

    /// Left outer join with another sheet on one or more key columns.
    ///
    /// Every row of `self` survives. Right-side key columns are not repeated;
    /// right columns whose names clash with a left column get a `_right`
    /// suffix. Rows without a match receive Null for the right columns.
    pub fn left_join(&self, other: &Sheet, keys: &[&str]) -> Result<Sheet> {
        let left_names = self.column_names.as_ref().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Left sheet columns not named".to_string())
        })?;
        let right_names = other.column_names.as_ref().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Right sheet columns not named".to_string())
        })?;

        let left_keys = keys
            .iter()
            .map(|k| {
                self.column_index_by_name(k)
                    .map_err(|_| SheetError::JoinKeyNotFound {
                        key: (*k).to_string(),
                        sheet: self.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let right_keys = keys
            .iter()
            .map(|k| {
                other
                    .column_index_by_name(k)
                    .map_err(|_| SheetError::JoinKeyNotFound {
                        key: (*k).to_string(),
                        sheet: other.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut right_map: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.data.iter().enumerate().skip(other.data_start()) {
            right_map
                .entry(Self::row_key(row, &right_keys))
                .or_default()
                .push(i);
        }

        let mut result_names: Vec<String> = left_names.clone();
        let right_cols_to_add: Vec<(usize, String)> = right_names
            .iter()
            .enumerate()
            .filter(|(i, _)| !right_keys.contains(i))
            .map(|(i, name)| {
                let final_name = if left_names.contains(name) {
                    format!("{name}_right")
                } else {
                    name.clone()
                };
                (i, final_name)
            })
            .collect();
        for (_, name) in &right_cols_to_add {
            result_names.push(name.clone());
        }

        let mut result_data: Vec<Vec<CellValue>> = Vec::with_capacity(self.data.len());
        result_data.push(
            result_names
                .iter()
                .map(|n| CellValue::String(n.clone()))
                .collect(),
        );

        for left_row in self.records() {
            let key = Self::row_key(left_row, &left_keys);
            match right_map.get(&key) {
                Some(right_indices) => {
                    for &right_idx in right_indices {
                        let right_row = &other.data[right_idx];
                        let mut new_row = left_row.clone();
                        for (col_idx, _) in &right_cols_to_add {
                            new_row.push(right_row.get(*col_idx).cloned().unwrap_or_default());
                        }
                        result_data.push(new_row);
                    }
                }
                None => {
                    let mut new_row = left_row.clone();
                    new_row.resize(left_row.len() + right_cols_to_add.len(), CellValue::Null);
                    result_data.push(new_row);
                }
            }
        }

        let mut result = Sheet {
            name: self.name.clone(),
            data: result_data,
            column_names: None,
            column_index: None,
        };
        result.name_columns_by_row(0)?;
        Ok(result)
    }

    // ===== Export Helpers =====

    /// Copy of this sheet holding only the header and the first `n` data rows
    #[must_use]
    pub fn head(&self, n: usize) -> Sheet {
        let mut out = self.clone();
        out.data.truncate(self.data_start() + n);
        out
    }

    /// Convert data rows to records keyed by column name
    #[must_use]
    pub fn to_records(&self) -> Option<Vec<IndexMap<String, CellValue>>> {
        let names = self.column_names.as_ref()?;
        Some(
            self.records()
                .map(|row| {
                    names
                        .iter()
                        .enumerate()
                        .map(|(i, n)| (n.clone(), row.get(i).cloned().unwrap_or_default()))
                        .collect()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(rows: Vec<Vec<&str>>) -> Sheet {
        let mut sheet = Sheet::from_data(rows);
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    #[test]
    fn test_record_count_skips_header() {
        let sheet = named(vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.record_count(), 2);
        assert_eq!(Sheet::new().record_count(), 0);
    }

    #[test]
    fn test_rename_columns_rewrites_header() {
        let mut sheet = named(vec![vec![" Date ", "AgentMIS"], vec!["x", "y"]]);
        sheet
            .rename_columns(|n| n.trim().to_lowercase())
            .unwrap();
        assert_eq!(
            sheet.column_names().unwrap(),
            &vec!["date".to_string(), "agentmis".to_string()]
        );
        assert_eq!(sheet.get(0, 0).unwrap().as_str(), "date");
        assert_eq!(sheet.get_by_name(1, "agentmis").unwrap().as_str(), "y");
    }

    #[test]
    fn test_rename_columns_detects_collisions() {
        let mut sheet = named(vec![vec!["Status", "status "]]);
        let err = sheet.rename_columns(|n| n.trim().to_lowercase());
        assert!(matches!(err, Err(SheetError::DuplicateColumnName { name }) if name == "status"));
    }

    #[test]
    fn test_blank_headers_get_positional_names() {
        let sheet = named(vec![vec!["id", "", " ", "note"], vec!["1", "a", "b", "c"]]);
        assert_eq!(
            sheet.column_names().unwrap(),
            &vec![
                "id".to_string(),
                "unnamed: 1".to_string(),
                "unnamed: 2".to_string(),
                "note".to_string()
            ]
        );
        assert_eq!(sheet.get_by_name(1, "unnamed: 2").unwrap().as_str(), "b");

        let mut dup = Sheet::from_data(vec![vec!["id", "", "id"]]);
        let err = dup.name_columns_by_row(0);
        assert!(matches!(err, Err(SheetError::DuplicateColumnName { name }) if name == "id"));
    }

    #[test]
    fn test_remove_empty_rows_keeps_header() {
        let mut sheet = Sheet::from_columns(
            "s",
            &["a", "b"],
            vec![
                vec![CellValue::Null, CellValue::Null],
                vec![CellValue::Int(1), CellValue::Null],
            ],
        )
        .unwrap();
        assert_eq!(sheet.remove_empty_rows(), 1);
        assert_eq!(sheet.record_count(), 1);
        assert!(sheet.has_column("a"));
    }

    #[test]
    fn test_group_rows_by_first_appearance() {
        let sheet = named(vec![
            vec!["k", "v"],
            vec!["b", "1"],
            vec!["a", "2"],
            vec!["b", "3"],
        ]);
        let groups = sheet.group_rows_by(&["k"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, vec![CellValue::from("b")]);
        assert_eq!(groups[0].rows, vec![1, 3]);
        assert_eq!(groups[1].rows, vec![2]);
    }

    #[test]
    fn test_group_keys_are_type_aware() {
        let sheet = Sheet::from_columns(
            "s",
            &["k"],
            vec![vec![CellValue::Int(1)], vec![CellValue::from("1")]],
        )
        .unwrap();
        assert_eq!(sheet.group_rows_by(&["k"]).unwrap().len(), 2);
    }

    #[test]
    fn test_append_aligns_by_name() {
        let mut left = named(vec![vec!["a", "b"], vec!["1", "2"]]);
        let right = named(vec![vec!["b", "c"], vec!["3", "4"]]);
        left.append(&right).unwrap();
        assert_eq!(left.record_count(), 2);
        assert!(left.get_by_name(2, "a").unwrap().is_null());
        assert_eq!(left.get_by_name(2, "b").unwrap().as_str(), "3");
    }

    #[test]
    fn test_left_join_multi_key() {
        let left = named(vec![
            vec!["d", "agent"],
            vec!["1", "x"],
            vec!["1", "y"],
            vec!["2", "x"],
        ]);
        let right = named(vec![vec!["agent", "d", "score"], vec!["x", "2", "9"]]);
        let joined = left.left_join(&right, &["d", "agent"]).unwrap();

        assert_eq!(
            joined.column_names().unwrap(),
            &vec!["d".to_string(), "agent".to_string(), "score".to_string()]
        );
        assert_eq!(joined.record_count(), 3);
        assert!(joined.get_by_name(1, "score").unwrap().is_null());
        assert!(joined.get_by_name(2, "score").unwrap().is_null());
        assert_eq!(joined.get_by_name(3, "score").unwrap().as_str(), "9");
    }

    #[test]
    fn test_left_join_missing_key() {
        let left = named(vec![vec!["a"], vec!["1"]]);
        let right = named(vec![vec!["b"], vec!["1"]]);
        let err = left.left_join(&right, &["a"]);
        assert!(matches!(err, Err(SheetError::JoinKeyNotFound { key, .. }) if key == "a"));
    }

    #[test]
    fn test_fill_nulls_only_touches_listed_columns() {
        let mut sheet = Sheet::from_columns(
            "s",
            &["k", "m"],
            vec![vec![CellValue::Null, CellValue::Null]],
        )
        .unwrap();
        let filled = sheet.fill_nulls(&["m"], &CellValue::Int(0)).unwrap();
        assert_eq!(filled, 1);
        assert!(sheet.get_by_name(1, "k").unwrap().is_null());
        assert_eq!(sheet.get_by_name(1, "m").unwrap(), &CellValue::Int(0));
    }

    #[test]
    fn test_head_and_records() {
        let sheet = named(vec![vec!["a"], vec!["1"], vec!["2"], vec!["3"]]);
        let head = sheet.head(2);
        assert_eq!(head.record_count(), 2);
        let records = head.to_records().unwrap();
        assert_eq!(records[1]["a"].as_str(), "2");
    }
}
