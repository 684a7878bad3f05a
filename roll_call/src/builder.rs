pub use crate::config::*;

/// A builder for adding attendance rows one at a time.
///
/// ```
/// pub use roll_call::builder::Builder;
/// pub use roll_call::Settings;
///
/// let mut builder = Builder::new(&Settings::DEFAULT_SETTINGS)
///     .roster(&["Anna Bell".to_string(), "Bob Stone".to_string()])
///     .trainer("Clara Trainer");
///
/// builder.add_row_simple("anna bell", "0:55:00");
/// builder.add_row_simple("Clara Trainer", "2:00:00");
/// builder.add_row_simple("Bob Stone (BCR12)", "12:30");
///
/// let outcome = builder.reconcile();
/// assert_eq!(outcome.present, vec!["Anna Bell".to_string()]);
/// assert_eq!(outcome.absent, vec!["Bob Stone".to_string()]);
/// ```
pub struct Builder {
    pub(crate) _settings: Settings,
    pub(crate) _roster: Vec<String>,
    pub(crate) _trainer: Option<String>,
    pub(crate) _rows: Vec<AttendanceRow>,
}

impl Builder {
    pub fn new(settings: &Settings) -> Builder {
        Builder {
            _settings: *settings,
            _roster: Vec::new(),
            _trainer: None,
            _rows: Vec::new(),
        }
    }

    /// Sets the canonical student names. They are used as given.
    pub fn roster(self, students: &[String]) -> Builder {
        Builder {
            _roster: students.to_vec(),
            ..self
        }
    }

    /// Sets the name of the trainer, whose rows are ignored.
    pub fn trainer(self, name: &str) -> Builder {
        Builder {
            _trainer: Some(name.to_string()),
            ..self
        }
    }

    /// Adds a row from its name and time text.
    pub fn add_row_simple(&mut self, name: &str, time: &str) {
        self.add_row(AttendanceRow::new(name, time))
    }

    pub fn add_row(&mut self, row: AttendanceRow) {
        self._rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self._rows.len()
    }

    /// Runs a full reconciliation over the rows added so far.
    ///
    /// Nothing is cached between calls.
    pub fn reconcile(&self) -> Outcome {
        crate::reconcile(
            &self._rows,
            &self._roster,
            &self._settings,
            self._trainer.as_deref(),
        )
    }
}
