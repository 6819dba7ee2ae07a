use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// A workbook: named sheets in worksheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheet names in worksheet order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    fn not_found(name: &str) -> SheetError {
        SheetError::SheetNotFound {
            name: name.to_string(),
        }
    }

    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets.get(name).ok_or_else(|| Self::not_found(name))
    }

    /// Add a sheet under `name`, which also becomes the sheet's own name.
    /// Names must be unique within the book.
    pub fn add_sheet(&mut self, name: &str, mut sheet: Sheet) -> Result<()> {
        if self.has_sheet(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Take a sheet out of the book, keeping the order of the others
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        self.sheets
            .shift_remove(name)
            .ok_or_else(|| Self::not_found(name))
    }

    /// Iterate over (name, sheet) pairs in worksheet order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book() {
        let book = Book::new();
        assert!(book.is_empty());
        assert_eq!(book.sheet_count(), 0);
        assert!(matches!(
            book.get_sheet("CHO"),
            Err(SheetError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn test_add_sheet_sets_name() {
        let mut book = Book::new();
        book.add_sheet("CHO", Sheet::from_data(vec![vec![1, 2]]))
            .unwrap();

        assert!(book.has_sheet("CHO"));
        assert_eq!(book.sheet_names(), vec!["CHO"]);
        assert_eq!(book.get_sheet("CHO").unwrap().name(), "CHO");
    }

    #[test]
    fn test_add_duplicate_sheet() {
        let mut book = Book::new();
        book.add_sheet("CHT", Sheet::new()).unwrap();
        let err = book.add_sheet("CHT", Sheet::new());
        assert!(matches!(err, Err(SheetError::SheetAlreadyExists { .. })));
    }

    #[test]
    fn test_remove_sheet_preserves_order() {
        let mut book = Book::new();
        for name in ["CHO", "CHT", "CHD"] {
            book.add_sheet(name, Sheet::new()).unwrap();
        }

        let removed = book.remove_sheet("CHT").unwrap();
        assert_eq!(removed.name(), "CHT");
        assert_eq!(book.sheet_names(), vec!["CHO", "CHD"]);
        assert!(matches!(
            book.remove_sheet("CHT"),
            Err(SheetError::SheetNotFound { .. })
        ));
    }
}
