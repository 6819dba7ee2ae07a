use crate::error::{PipelineError, Result};
use crate::source::SourceSheet;

/// Check that every required sheet is present.
///
/// Sheet names match exactly. The error lists every missing sheet, in
/// required order.
pub fn validate_sheet_names<S: AsRef<str>>(available: &[S]) -> Result<()> {
    let missing: Vec<String> = SourceSheet::ALL
        .iter()
        .map(|s| s.sheet_name())
        .filter(|name| !available.iter().any(|a| a.as_ref() == *name))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingSheets { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present_in_any_order() {
        assert!(validate_sheet_names(&["CHE", "Notes", "CHD", "CHT", "CHO"]).is_ok());
    }

    #[test]
    fn test_reports_every_missing_sheet() {
        let err = validate_sheet_names(&["CHO", "CHD"]).unwrap_err();
        match err {
            PipelineError::MissingSheets { missing } => assert_eq!(missing, vec!["CHT", "CHE"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let err = validate_sheet_names(&["cho", "CHT", "CHD", "CHE"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required sheets: CHO");
    }

    #[test]
    fn test_empty_workbook() {
        let names: [&str; 0] = [];
        let err = validate_sheet_names(&names).unwrap_err();
        assert_eq!(err.to_string(), "Missing required sheets: CHO, CHT, CHD, CHE");
    }
}
