// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// A single decoded spreadsheet cell.
///
/// Readers for CSV and workbook files map their own cell types onto this one
/// before handing the rows to the engine.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// The textual content of the cell, as it would be shown in a spreadsheet.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }

    /// True for empty cells and cells that only contain whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Cell {
        Cell::Number(n)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// One row of a meeting attendance export, reduced to the two columns the
/// engine cares about.
#[derive(PartialEq, Debug, Clone)]
pub struct AttendanceRow {
    pub name: Cell,
    pub time: Cell,
}

impl AttendanceRow {
    pub fn new(name: impl Into<Cell>, time: impl Into<Cell>) -> AttendanceRow {
        AttendanceRow {
            name: name.into(),
            time: time.into(),
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Status {
    Present,
    Absent,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Present => write!(f, "Present"),
            Status::Absent => write!(f, "Absent"),
        }
    }
}

/// The classification of one attendee row.
#[derive(PartialEq, Debug, Clone)]
pub struct AttendanceRecord {
    /// The roster name when the attendee was matched, the cleaned name otherwise.
    pub display_name: String,
    /// The name exactly as found in the export.
    pub original_name: String,
    pub raw_time: Cell,
    pub minutes: f64,
    pub status: Status,
    /// Not found on the roster.
    pub is_alternative: bool,
}

/// An attendee that was present but could not be matched to the roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AlternativeStudent {
    pub clean_name: String,
    /// Kept with its batch code, if any.
    pub original_name: String,
}

/// Everything produced by one reconciliation pass.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Outcome {
    pub records: Vec<AttendanceRecord>,
    pub alternatives: Vec<AlternativeStudent>,
    /// Matched and present, in input order.
    pub present: Vec<String>,
    /// Roster entries that were not present, in roster order.
    pub absent: Vec<String>,
}

/// A roster entry with the status it received in the last pass.
#[derive(PartialEq, Debug, Clone)]
pub struct RosterStatusRow {
    pub name: String,
    /// The raw time cell of the matching record, or "-".
    pub time: String,
    pub minutes: f64,
    pub status: Status,
}

/// The tabular view of an outcome.
///
/// Large classes only get one row per roster entry; smaller ones get every
/// processed record, including alternatives.
#[derive(PartialEq, Debug, Clone)]
pub enum ResultsView {
    Detailed(Vec<AttendanceRecord>),
    Simplified(Vec<RosterStatusRow>),
}

#[derive(PartialEq, Debug, Clone)]
pub struct ResultsSummary {
    pub present_count: usize,
    pub absent_count: usize,
    pub total_count: usize,
    pub view: ResultsView,
}

/// Errors that prevent a table from being processed or a roster from being updated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AttendanceError {
    /// The decoded table has no rows at all.
    EmptyTable,
    /// The header row lacks one of the required columns.
    MissingColumns { missing: Vec<&'static str> },
    /// A manually entered student name is blank.
    EmptyName,
    /// The student is already on the roster.
    DuplicateStudent(String),
}

impl Error for AttendanceError {}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceError::EmptyTable => write!(f, "The file does not contain any rows"),
            AttendanceError::MissingColumns { missing } => {
                let quoted: Vec<String> = missing.iter().map(|m| format!("{:?}", m)).collect();
                write!(
                    f,
                    "Could not find required columns: {}. Looking for {}",
                    missing.join(", "),
                    quoted.join(" and ")
                )
            }
            AttendanceError::EmptyName => write!(f, "Please enter a student name"),
            AttendanceError::DuplicateStudent(name) => {
                write!(f, "Student already exists in the list: {}", name)
            }
        }
    }
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Settings {
    /// Minimum minutes in the call to be counted as present (inclusive).
    pub time_threshold_minutes: f64,
}

impl Settings {
    pub const DEFAULT_SETTINGS: Settings = Settings {
        time_threshold_minutes: 48.0,
    };

    pub fn classify(&self, minutes: f64) -> Status {
        if minutes >= self.time_threshold_minutes {
            Status::Present
        } else {
            Status::Absent
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::DEFAULT_SETTINGS
    }
}

/// Size thresholds that switch the presentation of the results.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DisplayPolicy {
    /// Above this number of records, the results view only lists roster entries
    /// and the report leaves out the alternative students.
    pub large_class_threshold: usize,
    /// Below this number of present plus alternative attendees, alternative
    /// students are shown with their original name (batch code included).
    pub batch_code_display_threshold: usize,
}

impl DisplayPolicy {
    pub const DEFAULT_POLICY: DisplayPolicy = DisplayPolicy {
        large_class_threshold: 40,
        batch_code_display_threshold: 40,
    };
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        DisplayPolicy::DEFAULT_POLICY
    }
}

/// The free-form metadata printed at the top of a report.
///
/// Unset or blank fields are left out of the report.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReportMeta {
    pub batch_name: Option<String>,
    pub report_date: Option<NaiveDate>,
    pub coordinators: Option<String>,
    pub report_creator: Option<String>,
    pub tldv_link: Option<String>,
    pub session_summary: Option<String>,
}
