use agentkpi_sheet::SheetError;
use thiserror::Error;

/// The two user-facing failure families of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The workbook lacks one or more required sheets
    Validation,
    /// Anything that failed while loading, normalizing or aggregating
    Processing,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Processing => "processing",
        }
    }
}

/// Errors raised by the KPI pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing required sheets: {}", missing.join(", "))]
    MissingSheets { missing: Vec<String> },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}' row {row}: cannot parse date from '{value}'")]
    DateParse {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("Sheet '{sheet}' column '{column}': expected a number, found '{value}'")]
    TypeMismatch {
        sheet: String,
        column: String,
        value: String,
    },

    #[error("Sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: SheetError,
    },

    #[error(transparent)]
    Workbook(#[from] SheetError),
}

impl PipelineError {
    /// Which failure family this error belongs to
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MissingSheets { .. } => ErrorKind::Validation,
            _ => ErrorKind::Processing,
        }
    }

    /// Corrective guidance to show next to the error message
    #[must_use]
    pub fn hint(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => format!(
                "The workbook must contain the sheets {}.",
                crate::source::SourceSheet::ALL
                    .iter()
                    .map(|s| s.sheet_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ErrorKind::Processing => {
                "Check that each sheet has the documented columns and that dates and numeric columns hold valid values."
                    .to_string()
            }
        }
    }

    pub(crate) fn in_sheet(sheet: &str) -> impl FnOnce(SheetError) -> PipelineError + '_ {
        move |source| match source {
            SheetError::ColumnNotFound { name } => PipelineError::MissingColumn {
                sheet: sheet.to_string(),
                column: name,
            },
            source => PipelineError::Sheet {
                sheet: sheet.to_string(),
                source,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
