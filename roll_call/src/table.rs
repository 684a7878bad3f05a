//! Locating the header row and the interesting columns of a decoded table.

use log::debug;

use crate::config::{AttendanceError, AttendanceRow, Cell};

/// Substrings of participant names that belong to meeting bots.
pub const AUTOMATED_PARTICIPANT_MARKERS: &[&str] = &["AI Notetaker", "tldv.io"];

/// Accepted headers for the name column, by priority.
pub const NAME_HEADERS: &[&str] = &["full name", "name", "student name", "student"];
/// Accepted headers for the time column, by priority.
pub const TIME_HEADERS: &[&str] = &[
    "time in call",
    "time",
    "duration",
    "call time",
    "call duration",
];

/// Finds the column of the first alias present in the header.
///
/// Header cells are compared lowercased and trimmed. The order of `aliases`
/// decides, not the order of the columns.
pub fn find_column(header: &[Cell], aliases: &[&str]) -> Option<usize> {
    let lower_headers: Vec<String> = header
        .iter()
        .map(|c| c.as_text().trim().to_lowercase())
        .collect();
    aliases.iter().find_map(|alias| {
        let alias = alias.to_lowercase();
        lower_headers.iter().position(|h| *h == alias)
    })
}

/// The index of the header row.
///
/// Meeting providers put title and comment rows starting with `*` above the
/// header. The first row with a non-empty first cell that does not start with
/// `*` is the header; the first row is used if there is none.
pub fn header_row_index(rows: &[Vec<Cell>]) -> usize {
    rows.iter()
        .position(|row| {
            let first = row.first().map(|c| c.as_text()).unwrap_or_default();
            let first = first.trim();
            !first.is_empty() && !first.starts_with('*')
        })
        .unwrap_or(0)
}

pub fn is_automated_participant(name: &str) -> bool {
    AUTOMATED_PARTICIPANT_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

fn cell_at(row: &[Cell], idx: usize) -> Cell {
    row.get(idx).cloned().unwrap_or(Cell::Empty)
}

/// Extracts the name and time columns of an attendance export.
///
/// Returns `MissingColumns` when either column cannot be found.
pub fn attendance_rows(rows: &[Vec<Cell>]) -> Result<Vec<AttendanceRow>, AttendanceError> {
    let header_idx = header_row_index(rows);
    let header = rows.get(header_idx).ok_or(AttendanceError::EmptyTable)?;
    debug!("attendance_rows: header: {:?}", header);

    let name_col = find_column(header, NAME_HEADERS);
    let time_col = find_column(header, TIME_HEADERS);
    let (name_col, time_col) = match (name_col, time_col) {
        (Some(n), Some(t)) => (n, t),
        (n, t) => {
            let mut missing = Vec::new();
            if n.is_none() {
                missing.push("Full Name");
            }
            if t.is_none() {
                missing.push("Time in Call");
            }
            return Err(AttendanceError::MissingColumns { missing });
        }
    };
    debug!(
        "attendance_rows: name column: {} time column: {}",
        name_col, time_col
    );

    Ok(rows[header_idx + 1..]
        .iter()
        .map(|row| AttendanceRow {
            name: cell_at(row, name_col),
            time: cell_at(row, time_col),
        })
        .collect())
}

/// Extracts the raw student names of a roster file.
///
/// Blank cells and automated notetakers are left out.
pub fn roster_names(rows: &[Vec<Cell>]) -> Result<Vec<String>, AttendanceError> {
    let header_idx = header_row_index(rows);
    let header = rows.get(header_idx).ok_or(AttendanceError::EmptyTable)?;
    let name_col = find_column(header, NAME_HEADERS).ok_or(AttendanceError::MissingColumns {
        missing: vec!["Name"],
    })?;
    debug!("roster_names: header: {:?} name column: {}", header, name_col);

    Ok(rows[header_idx + 1..]
        .iter()
        .map(|row| cell_at(row, name_col))
        .filter(|c| !c.is_blank())
        .map(|c| c.as_text())
        .filter(|name| !is_automated_participant(name))
        .collect())
}
