use crate::rollcall::store::KeyValueStore;
use crate::rollcall::*;

use chrono::NaiveDate;
use roll_call::{ReportMeta, Roster, Settings};
use serde::{Deserialize, Serialize};

pub const STUDENTS_KEY: &str = "students";
pub const REPORT_SETTINGS_KEY: &str = "reportSettings";
pub const ATTENDANCE_SETTINGS_KEY: &str = "attendanceSettings";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(rename = "batchName", default)]
    pub batch_name: Option<String>,
    #[serde(rename = "reportDate", default)]
    pub report_date: Option<String>,
    #[serde(rename = "trainerName", default)]
    pub trainer_name: Option<String>,
    #[serde(rename = "coordinators", default)]
    pub coordinators: Option<String>,
    #[serde(rename = "reportCreator", default)]
    pub report_creator: Option<String>,
    #[serde(rename = "tldvLink", default)]
    pub tldv_link: Option<String>,
    #[serde(rename = "sessionSummary", default)]
    pub session_summary: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceSettings {
    #[serde(rename = "timeThreshold", default)]
    pub time_threshold: Option<f64>,
    // Kept for compatibility with older state files, times are always read the same way.
    #[serde(rename = "timeFormat", default)]
    pub time_format: Option<String>,
}

/// The persisted state: roster, attendance settings and report settings.
///
/// It is only read from and written to a store through [Session::load] and
/// [Session::save].
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Session {
    pub roster: Roster,
    pub attendance_settings: AttendanceSettings,
    pub report_settings: ReportSettings,
}

fn read_key<T: for<'de> Deserialize<'de> + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<T> {
    match store.get(key) {
        Some(s) => {
            debug!("read_key: {}: {}", key, s);
            serde_json::from_str(&s).context(ParsingJsonSnafu {})
        }
        None => Ok(T::default()),
    }
}

fn write_key<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> AppResult<()> {
    let s = serde_json::to_string(value).context(ParsingJsonSnafu {})?;
    store.set(key, s);
    Ok(())
}

// Blank strings are treated as unset.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

impl Session {
    pub fn load(store: &dyn KeyValueStore) -> AppResult<Session> {
        let students: Vec<String> = read_key(store, STUDENTS_KEY)?;
        let attendance_settings: AttendanceSettings = read_key(store, ATTENDANCE_SETTINGS_KEY)?;
        let report_settings: ReportSettings = read_key(store, REPORT_SETTINGS_KEY)?;
        info!(
            "Session loaded: {} students, threshold: {:?}",
            students.len(),
            attendance_settings.time_threshold
        );
        Ok(Session {
            roster: Roster::from_names(students),
            attendance_settings,
            report_settings,
        })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        write_key(store, STUDENTS_KEY, &self.roster.names())?;
        write_key(store, ATTENDANCE_SETTINGS_KEY, &self.attendance_settings)?;
        write_key(store, REPORT_SETTINGS_KEY, &self.report_settings)?;
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        match self.attendance_settings.time_threshold {
            Some(t) if t.is_finite() => Settings {
                time_threshold_minutes: t,
            },
            _ => Settings::DEFAULT_SETTINGS,
        }
    }

    pub fn trainer_name(&self) -> Option<String> {
        non_blank(&self.report_settings.trainer_name)
    }

    /// The report metadata. The date falls back to `today` when it is not set
    /// or cannot be read.
    pub fn report_meta(&self, today: NaiveDate) -> ReportMeta {
        let rs = &self.report_settings;
        let report_date = match non_blank(&rs.report_date) {
            Some(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => {
                    warn!("Cannot read report date {:?} ({}), using {}", s, e, today);
                    today
                }
            },
            None => today,
        };
        ReportMeta {
            batch_name: non_blank(&rs.batch_name),
            report_date: Some(report_date),
            coordinators: non_blank(&rs.coordinators),
            report_creator: non_blank(&rs.report_creator),
            tldv_link: non_blank(&rs.tldv_link),
            session_summary: non_blank(&rs.session_summary),
        }
    }
}
