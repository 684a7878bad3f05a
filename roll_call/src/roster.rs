use log::{debug, info, warn};

use crate::config::{AttendanceError, Cell};
use crate::names::{clean_student_name, normalize_for_matching};
use crate::table::roster_names;

/// The list of students of a class, in insertion order.
///
/// Names are stored in their cleaned display form. Entries are only added
/// through imports or manual additions and only go away when removed
/// explicitly.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Roster {
    students: Vec<String>,
}

/// What happened during a roster import.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ImportSummary {
    /// Student names found in the file.
    pub found: usize,
    /// Names that were not on the roster yet.
    pub added: usize,
}

impl Roster {
    pub fn new() -> Roster {
        Roster::default()
    }

    /// Restores a roster from persisted names, which are trusted as-is.
    pub fn from_names(students: Vec<String>) -> Roster {
        Roster { students }
    }

    pub fn names(&self) -> &[String] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.iter().any(|s| s == name)
    }

    /// Cleans and appends a name, unless the cleaned name is already present.
    ///
    /// Deduplication uses the cleaned form only. Two names that differ in that
    /// form but share a matching key are both kept, with a warning, since
    /// lookups will only ever reach the first one.
    pub fn insert(&mut self, raw_name: &str) -> bool {
        let clean = clean_student_name(raw_name);
        if clean.is_empty() || self.contains(&clean) {
            debug!("insert: skipping {:?} (cleaned: {:?})", raw_name, clean);
            return false;
        }
        let key = normalize_for_matching(&clean);
        if let Some(other) = self
            .students
            .iter()
            .find(|s| normalize_for_matching(s) == key)
        {
            warn!(
                "insert: {:?} matches existing student {:?}; attendance will be reported under {:?}",
                clean, other, other
            );
        }
        self.students.push(clean);
        true
    }

    /// Adds every student of a decoded roster file.
    pub fn import_rows(&mut self, rows: &[Vec<Cell>]) -> Result<ImportSummary, AttendanceError> {
        let names = roster_names(rows)?;
        let added = names.iter().filter(|n| self.insert(n)).count();
        info!(
            "import_rows: {} students found, {} added (total: {})",
            names.len(),
            added,
            self.len()
        );
        Ok(ImportSummary {
            found: names.len(),
            added,
        })
    }

    /// Adds a single student typed in by the user, returning the stored name.
    pub fn add_manual(&mut self, name: &str) -> Result<String, AttendanceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AttendanceError::EmptyName);
        }
        let clean = clean_student_name(name);
        if clean.is_empty() {
            return Err(AttendanceError::EmptyName);
        }
        if self.contains(&clean) {
            return Err(AttendanceError::DuplicateStudent(clean));
        }
        self.insert(&clean);
        Ok(clean)
    }

    /// Removes a student by exact stored name.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s != name);
        before != self.students.len()
    }

    pub fn clear(&mut self) {
        self.students.clear();
    }

    /// The names in alphabetical order.
    pub fn sorted(&self) -> Vec<String> {
        let mut res = self.students.clone();
        res.sort();
        res
    }
}
