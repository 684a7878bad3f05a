/*!
Reconciliation of meeting attendance exports against a class roster.

The entry points are [reconcile], which classifies every attendee of an export,
[results_view], which turns the outcome into a table, and [report::compose],
which renders the final text report. The [builder::Builder] offers an
incremental way to feed rows.

```
use roll_call::*;

let roster = vec!["Ali Khan".to_string(), "Sara Malik".to_string()];
let rows = vec![
    AttendanceRow::new("ali  khan", "50:00"),
    AttendanceRow::new("Sara Malik (BCR78)", "10"),
    AttendanceRow::new("New Person", "60"),
];
let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
assert_eq!(outcome.present, vec!["Ali Khan".to_string()]);
assert_eq!(outcome.absent, vec!["Sara Malik".to_string()]);
assert_eq!(outcome.alternatives[0].clean_name, "New Person");
```
*/

mod config;
pub mod builder;
pub mod manual;
pub mod names;
pub mod report;
pub mod roster;
pub mod table;
pub mod time;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::names::{clean_student_name, normalize_for_matching};
pub use crate::roster::Roster;
pub use crate::table::attendance_rows;
pub use crate::time::parse_time_to_minutes;

// A roster entry with its precomputed comparison key.
struct RosterKey<'a> {
    name: &'a String,
    key: String,
}

/// Classifies the attendees of an export against the roster.
///
/// Arguments:
/// * `rows` the name and time cells of the export, header excluded
/// * `roster` the canonical student names
/// * `settings` the presence threshold
/// * `trainer_name` if provided, the rows of the trainer are dropped
///
/// Rows with a blank name and rows from meeting bots are dropped as well.
/// Every other row produces exactly one record.
pub fn reconcile(
    rows: &[AttendanceRow],
    roster: &[String],
    settings: &Settings,
    trainer_name: Option<&str>,
) -> Outcome {
    info!(
        "reconcile: processing {} rows against {} students, threshold: {} min",
        rows.len(),
        roster.len(),
        settings.time_threshold_minutes
    );

    let roster_keys: Vec<RosterKey> = roster
        .iter()
        .map(|name| RosterKey {
            name,
            key: normalize_for_matching(name),
        })
        .collect();

    let trainer_key: Option<String> = trainer_name
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(normalize_for_matching);

    let mut records: Vec<AttendanceRecord> = Vec::new();
    let mut alternatives: Vec<AlternativeStudent> = Vec::new();
    let mut alternative_keys: HashSet<String> = HashSet::new();

    for (idx, row) in rows.iter().enumerate() {
        if row.name.is_blank() {
            continue;
        }
        let original_name = row.name.as_text();
        if table::is_automated_participant(&original_name) {
            debug!("reconcile: row {}: skipping bot {:?}", idx, original_name);
            continue;
        }

        let clean_name = clean_student_name(&original_name);
        let key = normalize_for_matching(&clean_name);

        if let Some(trainer) = trainer_key.as_ref() {
            if key == *trainer || normalize_for_matching(&original_name) == *trainer {
                debug!("reconcile: row {}: skipping trainer {:?}", idx, original_name);
                continue;
            }
        }

        let matched: Option<&String> = roster_keys
            .iter()
            .find(|rk| rk.key == key)
            .map(|rk| rk.name);
        let is_alternative = matched.is_none();
        let display_name = matched.cloned().unwrap_or_else(|| clean_name.clone());

        let minutes = parse_time_to_minutes(&row.time);
        let status = settings.classify(minutes);
        debug!(
            "reconcile: row {}: {:?} -> {:?} {:.2} min {} alternative: {}",
            idx, original_name, display_name, minutes, status, is_alternative
        );

        if is_alternative && status == Status::Present && alternative_keys.insert(key) {
            alternatives.push(AlternativeStudent {
                clean_name: clean_name.clone(),
                original_name: original_name.clone(),
            });
        }

        records.push(AttendanceRecord {
            display_name,
            original_name,
            raw_time: row.time.clone(),
            minutes,
            status,
            is_alternative,
        });
    }

    let present = present_students(&records);
    let absent = absent_students(&records, roster);
    info!(
        "reconcile: {} records, {} present, {} absent, {} alternatives",
        records.len(),
        present.len(),
        absent.len(),
        alternatives.len()
    );

    Outcome {
        records,
        alternatives,
        present,
        absent,
    }
}

/// The matched students that were present, once each, in input order.
pub fn present_students(records: &[AttendanceRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| r.status == Status::Present && !r.is_alternative)
        .filter(|r| seen.insert(r.display_name.as_str()))
        .map(|r| r.display_name.clone())
        .collect()
}

/// The roster entries without any present record, in roster order.
pub fn absent_students(records: &[AttendanceRecord], roster: &[String]) -> Vec<String> {
    let present_keys: HashSet<String> = records
        .iter()
        .filter(|r| r.status == Status::Present)
        .map(|r| normalize_for_matching(&r.display_name))
        .collect();
    roster
        .iter()
        .filter(|s| !present_keys.contains(&normalize_for_matching(s)))
        .cloned()
        .collect()
}

/// Builds the table shown after processing an export.
///
/// Classes above the policy's size threshold get one row per roster entry,
/// sorted by name without regard to case. Smaller ones get every record in input order.
pub fn results_view(outcome: &Outcome, roster: &[String], policy: &DisplayPolicy) -> ResultsSummary {
    let records = &outcome.records;
    let present_count = records
        .iter()
        .filter(|r| r.status == Status::Present)
        .count();
    let absent_count = records.len() - present_count;

    let view = if records.len() > policy.large_class_threshold {
        // Later records win when an attendee joined several times.
        let present_by_key: HashMap<String, &AttendanceRecord> = records
            .iter()
            .filter(|r| r.status == Status::Present)
            .map(|r| (normalize_for_matching(&r.display_name), r))
            .collect();
        let mut rows: Vec<RosterStatusRow> = roster
            .iter()
            .map(|name| {
                let key = normalize_for_matching(&clean_student_name(name));
                match present_by_key.get(&key) {
                    Some(r) => RosterStatusRow {
                        name: name.clone(),
                        time: r.raw_time.as_text(),
                        minutes: r.minutes,
                        status: Status::Present,
                    },
                    None => RosterStatusRow {
                        name: name.clone(),
                        time: "-".to_string(),
                        minutes: 0.0,
                        status: Status::Absent,
                    },
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        ResultsView::Simplified(rows)
    } else {
        ResultsView::Detailed(records.clone())
    };

    ResultsSummary {
        present_count,
        absent_count,
        total_count: records.len(),
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn end_to_end_scenario() {
        init_logger();
        let roster = names(&["Ali Khan", "Sara Malik"]);
        let rows = vec![
            AttendanceRow::new("ali  khan", "50:00"),
            AttendanceRow::new("Sara Malik (BCR78)", "10"),
            AttendanceRow::new("New Person", "60"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        assert_eq!(outcome.present, names(&["Ali Khan"]));
        assert_eq!(outcome.absent, names(&["Sara Malik"]));
        assert_eq!(
            outcome.alternatives,
            vec![AlternativeStudent {
                clean_name: "New Person".to_string(),
                original_name: "New Person".to_string(),
            }]
        );
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.records[0].display_name, "Ali Khan");
        assert_eq!(outcome.records[0].original_name, "ali  khan");
        assert_eq!(outcome.records[1].status, Status::Absent);
        assert!(!outcome.records[1].is_alternative);
        assert!(outcome.records[2].is_alternative);
    }

    #[test]
    fn threshold_boundary() {
        let roster = names(&["Ali Khan", "Sara Malik"]);
        let rows = vec![
            AttendanceRow::new("Ali Khan", Cell::Number(48.0)),
            AttendanceRow::new("Sara Malik", Cell::Number(47.99)),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        assert_eq!(outcome.records[0].status, Status::Present);
        assert_eq!(outcome.records[1].status, Status::Absent);

        let lenient = Settings {
            time_threshold_minutes: 30.0,
        };
        let outcome = reconcile(&rows, &roster, &lenient, None);
        assert_eq!(outcome.present, roster);
        assert!(outcome.absent.is_empty());
    }

    #[test]
    fn skips_blank_bot_and_trainer_rows() {
        let roster = names(&["Ali Khan"]);
        let rows = vec![
            AttendanceRow::new("", "60"),
            AttendanceRow::new(Cell::Empty, Cell::Empty),
            AttendanceRow::new("Ali's AI Notetaker", "60"),
            AttendanceRow::new("tldv.io recorder", "60"),
            AttendanceRow::new("Hassan Raza (CMBCR 3)", "90"),
            AttendanceRow::new("Ali Khan", "55"),
        ];
        let outcome = reconcile(
            &rows,
            &roster,
            &Settings::DEFAULT_SETTINGS,
            Some("hassan  raza"),
        );
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.present, names(&["Ali Khan"]));
        assert!(outcome.alternatives.is_empty());

        // A blank trainer name filters nothing.
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, Some("  "));
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn trainer_matched_on_raw_name() {
        let rows = vec![AttendanceRow::new("Coach BCR1", "90")];
        let outcome = reconcile(&rows, &[], &Settings::DEFAULT_SETTINGS, Some("coachbcr1"));
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn matches_spelling_variants_and_spacing() {
        let roster = names(&["Muhammad Usman", "Ayesha Siddiqui"]);
        let rows = vec![
            AttendanceRow::new("mohammed usman CM", "1:00:00"),
            AttendanceRow::new("AyeshaSiddiqui", "49"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        assert_eq!(outcome.present, roster);
        assert!(outcome.absent.is_empty());
        assert!(outcome.records.iter().all(|r| !r.is_alternative));
    }

    #[test]
    fn absent_alternatives_are_not_listed() {
        let rows = vec![AttendanceRow::new("Guest", "5")];
        let outcome = reconcile(&rows, &names(&["Ali Khan"]), &Settings::DEFAULT_SETTINGS, None);
        assert!(outcome.alternatives.is_empty());
        assert!(outcome.records[0].is_alternative);
        assert_eq!(outcome.absent, names(&["Ali Khan"]));
    }

    #[test]
    fn repeated_attendees_listed_once() {
        let roster = names(&["Ali Khan", "Sara Malik"]);
        let rows = vec![
            AttendanceRow::new("Ali Khan", "50"),
            AttendanceRow::new("Guest One (BCR9)", "50"),
            AttendanceRow::new("ali khan", "60"),
            AttendanceRow::new("guest one", "70"),
            AttendanceRow::new("Sara Malik", "3"),
            AttendanceRow::new("Sara Malik", "58"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        assert_eq!(outcome.records.len(), 6);
        assert_eq!(outcome.present, names(&["Ali Khan", "Sara Malik"]));
        assert!(outcome.absent.is_empty());
        assert_eq!(
            outcome.alternatives,
            vec![AlternativeStudent {
                clean_name: "Guest One".to_string(),
                original_name: "Guest One (BCR9)".to_string(),
            }]
        );
    }

    #[test]
    fn no_records_means_everyone_absent() {
        let roster = names(&["Ali Khan", "Sara Malik"]);
        let rows = vec![AttendanceRow::new("", "")];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        assert!(outcome.records.is_empty());
        assert!(outcome.present.is_empty());
        assert_eq!(outcome.absent, roster);
    }

    #[test]
    fn completeness() {
        let roster = names(&["A One", "B Two", "C Three", "D Four"]);
        let rows = vec![
            AttendanceRow::new("b two", "60"),
            AttendanceRow::new("D Four", "10"),
            AttendanceRow::new("Stranger", "60"),
            AttendanceRow::new("a one", "48"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        for s in roster.iter() {
            let in_present = outcome.present.iter().filter(|p| *p == s).count();
            let in_absent = outcome.absent.iter().filter(|a| *a == s).count();
            assert_eq!(in_present + in_absent, 1, "{}", s);
        }
        assert!(!outcome.present.contains(&"Stranger".to_string()));
        assert!(!outcome.absent.contains(&"Stranger".to_string()));
        assert_eq!(outcome.alternatives.len(), 1);
    }

    #[test]
    fn detailed_view_for_small_classes() {
        let roster = names(&["Ali Khan"]);
        let rows = vec![
            AttendanceRow::new("Ali Khan", "50"),
            AttendanceRow::new("Guest", "5"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        let summary = results_view(&outcome, &roster, &DisplayPolicy::DEFAULT_POLICY);
        assert_eq!(summary.present_count, 1);
        assert_eq!(summary.absent_count, 1);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.view, ResultsView::Detailed(outcome.records.clone()));
    }

    #[test]
    fn simplified_view_for_large_classes() {
        let roster = names(&["Zara Ahmed", "Ali Khan"]);
        let rows = vec![
            AttendanceRow::new("Ali Khan", "50"),
            AttendanceRow::new("Guest", "60"),
            AttendanceRow::new("ali khan", "1:10:00"),
        ];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        let policy = DisplayPolicy {
            large_class_threshold: 2,
            ..DisplayPolicy::DEFAULT_POLICY
        };
        let summary = results_view(&outcome, &roster, &policy);
        assert_eq!(summary.present_count, 3);
        assert_eq!(
            summary.view,
            ResultsView::Simplified(vec![
                RosterStatusRow {
                    name: "Ali Khan".to_string(),
                    time: "1:10:00".to_string(),
                    minutes: 70.0,
                    status: Status::Present,
                },
                RosterStatusRow {
                    name: "Zara Ahmed".to_string(),
                    time: "-".to_string(),
                    minutes: 0.0,
                    status: Status::Absent,
                },
            ])
        );
    }

    #[test]
    fn simplified_view_sorts_ignoring_case() {
        let roster = names(&["bilal ahmed", "Zara Ahmed", "amna Tariq", "Bilal Ahmed"]);
        let rows = vec![AttendanceRow::new("Guest", "10")];
        let outcome = reconcile(&rows, &roster, &Settings::DEFAULT_SETTINGS, None);
        let policy = DisplayPolicy {
            large_class_threshold: 0,
            ..DisplayPolicy::DEFAULT_POLICY
        };
        let order: Vec<String> = match results_view(&outcome, &roster, &policy).view {
            ResultsView::Simplified(rows) => rows.into_iter().map(|r| r.name).collect(),
            other => panic!("unexpected view {:?}", other),
        };
        assert_eq!(
            order,
            names(&["amna Tariq", "Bilal Ahmed", "bilal ahmed", "Zara Ahmed"])
        );
    }
}
