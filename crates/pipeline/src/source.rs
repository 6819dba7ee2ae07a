//! The four source sheets and their input schemas.

/// Normalized name of the date column shared by every sheet
pub const DATE_COLUMN: &str = "date";
/// Normalized name of the agent-identifier column shared by every sheet
pub const AGENT_COLUMN: &str = "agentmis";
/// The (date, agent) record key
pub const KEY_COLUMNS: [&str; 2] = [DATE_COLUMN, AGENT_COLUMN];

/// One of the four required input sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSheet {
    Attendance,
    CallHandling,
    Satisfaction,
    Evaluation,
}

impl SourceSheet {
    /// All sources, in base-building and consolidation order
    pub const ALL: [SourceSheet; 4] = [
        SourceSheet::Attendance,
        SourceSheet::CallHandling,
        SourceSheet::Satisfaction,
        SourceSheet::Evaluation,
    ];

    /// Sheet name expected in the workbook
    #[must_use]
    pub fn sheet_name(self) -> &'static str {
        match self {
            SourceSheet::Attendance => "CHO",
            SourceSheet::CallHandling => "CHT",
            SourceSheet::Satisfaction => "CHD",
            SourceSheet::Evaluation => "CHE",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceSheet::Attendance => "attendance",
            SourceSheet::CallHandling => "call handling",
            SourceSheet::Satisfaction => "satisfaction",
            SourceSheet::Evaluation => "evaluation",
        }
    }

    /// Normalized columns the sheet must carry
    #[must_use]
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            SourceSheet::Attendance => &[DATE_COLUMN, AGENT_COLUMN, "status"],
            SourceSheet::CallHandling => &[DATE_COLUMN, AGENT_COLUMN, "ans_vol", "aht", "art"],
            SourceSheet::Satisfaction => &[DATE_COLUMN, AGENT_COLUMN, "score", "sloved"],
            SourceSheet::Evaluation => &[
                DATE_COLUMN,
                AGENT_COLUMN,
                "final",
                "rc1",
                "rc2",
                "rc",
                "bc",
                "cc",
            ],
        }
    }
}
