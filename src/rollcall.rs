use log::{debug, info, warn};

use roll_call::report::compose;
use roll_call::*;
use snafu::{prelude::*, Snafu};

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::*;
use crate::rollcall::config_reader::*;
use crate::rollcall::io_common::read_table;
use crate::rollcall::store::JsonFileStore;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod store;

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook {path} does not contain any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening file {path}: {source}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the CSV file: {source}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display(
        "Unsupported file format {extension:?}. Please provide a CSV or Excel file"
    ))]
    UnsupportedFormat { extension: String },
    #[snafu(display("Error reading {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}: {source}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("{source}"))]
    Attendance { source: AttendanceError },
    #[snafu(display("Error writing the report to {path}: {source}"))]
    WritingReport {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the reference report {path}: {source}"))]
    ReadingReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the generated report and the reference {path}"))]
    ReportMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

/// The result of processing one attendance export.
#[derive(Debug, Clone)]
pub struct Processed {
    pub outcome: Outcome,
    pub summary: ResultsSummary,
    pub report: String,
}

/// Reads an attendance export and builds the results and the report for the
/// current session state.
pub fn process_attendance(
    session: &Session,
    input: &str,
    policy: &DisplayPolicy,
    today: NaiveDate,
) -> AppResult<Processed> {
    let rows = read_table(input)?;
    let attendance = attendance_rows(&rows).context(AttendanceSnafu {})?;
    let trainer = session.trainer_name();
    let outcome = reconcile(
        &attendance,
        session.roster.names(),
        &session.settings(),
        trainer.as_deref(),
    );
    let summary = results_view(&outcome, session.roster.names(), policy);
    let report = compose(&outcome, &session.report_meta(today), policy);
    Ok(Processed {
        outcome,
        summary,
        report,
    })
}

pub fn format_results(summary: &ResultsSummary, policy: &DisplayPolicy) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Present: {}  Absent: {}  Total: {}",
        summary.present_count, summary.absent_count, summary.total_count
    );
    match &summary.view {
        ResultsView::Simplified(rows) => {
            let _ = writeln!(
                output,
                "Large class detected (>{}). Showing simplified status for main list students only.",
                policy.large_class_threshold
            );
            let _ = writeln!(
                output,
                "{:<32} {:>12} {:>8}  Status",
                "Student Name", "Time in Call", "Minutes"
            );
            for r in rows {
                let minutes = if r.minutes > 0.0 {
                    format!("{:.2}", r.minutes)
                } else {
                    "-".to_string()
                };
                let _ = writeln!(
                    output,
                    "{:<32} {:>12} {:>8}  {}",
                    r.name, r.time, minutes, r.status
                );
            }
        }
        ResultsView::Detailed(records) => {
            let _ = writeln!(
                output,
                "{:<32} {:>12} {:>8}  {:<8} Type",
                "Student Name", "Time in Call", "Minutes", "Status"
            );
            for r in records {
                let kind = if r.is_alternative {
                    "Alternative"
                } else {
                    "Regular"
                };
                let _ = writeln!(
                    output,
                    "{:<32} {:>12} {:>8.2}  {:<8} {}",
                    r.display_name,
                    r.raw_time.to_string(),
                    r.minutes,
                    r.status.to_string(),
                    kind
                );
            }
        }
    }
    output
}

/// Compares a report with the content of a reference file.
pub fn check_reference(report: &str, reference_path: &str) -> AppResult<()> {
    let reference = fs::read_to_string(reference_path).context(ReadingReferenceSnafu {
        path: reference_path,
    })?;
    if reference != report {
        warn!("Found differences with the reference report");
        print_diff(reference.as_str(), report, "\n");
        return ReportMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    Ok(())
}

fn write_report(report: &str, out: Option<&str>) -> AppResult<()> {
    match out {
        None | Some("") | Some("stdout") => {
            print!("{}", report);
            Ok(())
        }
        Some(path) => {
            fs::write(path, report).context(WritingReportSnafu { path })?;
            info!("Report written to {:?}", path);
            Ok(())
        }
    }
}

// The run-specific fields are remembered for the next runs.
fn apply_process_overrides(session: &mut Session, p: &ProcessArgs) -> bool {
    let rs = &mut session.report_settings;
    let mut changed = false;
    for (field, value) in [
        (&mut rs.report_date, &p.report_date),
        (&mut rs.tldv_link, &p.tldv_link),
        (&mut rs.session_summary, &p.session_summary),
    ] {
        if let Some(v) = value {
            *field = Some(v.clone());
            changed = true;
        }
    }
    changed
}

fn run_process(session: &Session, p: &ProcessArgs) -> AppResult<()> {
    let policy = DisplayPolicy::DEFAULT_POLICY;
    let today = Local::now().date_naive();
    let processed = process_attendance(session, &p.input, &policy, today)?;
    println!("{}", format_results(&processed.summary, &policy));
    write_report(&processed.report, p.out.as_deref())?;
    if let Some(reference) = p.reference.as_deref() {
        check_reference(&processed.report, reference)?;
    }
    Ok(())
}

fn run_roster(session: &mut Session, cmd: &RosterCommand) -> AppResult<bool> {
    let roster = &mut session.roster;
    match cmd {
        RosterCommand::Import { file } => {
            let rows = read_table(file)?;
            let summary = roster.import_rows(&rows).context(AttendanceSnafu {})?;
            println!(
                "Successfully read {} students, {} new (Total: {})",
                summary.found,
                summary.added,
                roster.len()
            );
            Ok(summary.added > 0)
        }
        RosterCommand::Add { name } => {
            let added = roster.add_manual(name).context(AttendanceSnafu {})?;
            println!("Added {} (Total: {})", added, roster.len());
            Ok(true)
        }
        RosterCommand::Remove { name } => {
            if !roster.remove(name) {
                whatever!("No student named {:?} in the list", name);
            }
            println!("Removed {} (Total: {})", name, roster.len());
            Ok(true)
        }
        RosterCommand::Clear { yes } => {
            if !yes {
                whatever!("This will permanently delete ALL students from the list. Pass --yes to confirm.");
            }
            roster.clear();
            println!("All students removed");
            Ok(true)
        }
        RosterCommand::List => {
            println!("{} students", roster.len());
            for name in roster.sorted() {
                println!("{}", name);
            }
            Ok(false)
        }
    }
}

fn set_field(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *field = if v.trim().is_empty() {
            None
        } else {
            Some(v.clone())
        };
    }
}

fn apply_settings(session: &mut Session, values: &SettingsValues) -> AppResult<()> {
    let rs = &mut session.report_settings;
    set_field(&mut rs.batch_name, &values.batch_name);
    set_field(&mut rs.report_date, &values.report_date);
    set_field(&mut rs.trainer_name, &values.trainer_name);
    set_field(&mut rs.coordinators, &values.coordinators);
    set_field(&mut rs.report_creator, &values.report_creator);
    set_field(&mut rs.tldv_link, &values.tldv_link);
    set_field(&mut rs.session_summary, &values.session_summary);
    if let Some(t) = values.threshold {
        if !t.is_finite() || t < 0.0 {
            whatever!("The threshold must be a positive number of minutes, got {}", t);
        }
        session.attendance_settings.time_threshold = Some(t);
    }
    Ok(())
}

fn run_settings(session: &mut Session, cmd: &SettingsCommand) -> AppResult<bool> {
    match cmd {
        SettingsCommand::Show => {
            let rs = &session.report_settings;
            let show = |v: &Option<String>| v.clone().unwrap_or_default();
            println!("Batch name:       {}", show(&rs.batch_name));
            println!("Report date:      {}", show(&rs.report_date));
            println!("Trainer name:     {}", show(&rs.trainer_name));
            println!("Coordinators:     {}", show(&rs.coordinators));
            println!("Report creator:   {}", show(&rs.report_creator));
            println!("TL;DV link:       {}", show(&rs.tldv_link));
            println!("Session summary:  {}", show(&rs.session_summary));
            println!(
                "Threshold (min):  {}",
                session.settings().time_threshold_minutes
            );
            Ok(false)
        }
        SettingsCommand::Set(values) => {
            apply_settings(session, values)?;
            println!("Report settings saved successfully!");
            Ok(true)
        }
    }
}

fn save_session(session: &Session, store: &mut JsonFileStore) -> AppResult<()> {
    debug!("save_session: saving state to {:?}", store.path());
    session.save(store)?;
    store.flush()
}

pub fn run(args: &Args) -> AppResult<()> {
    let mut store = JsonFileStore::open(Path::new(&args.state))?;
    let mut session = Session::load(&store)?;
    match &args.command {
        Command::Roster(cmd) => {
            if run_roster(&mut session, cmd)? {
                save_session(&session, &mut store)?;
            }
        }
        Command::Settings(cmd) => {
            if run_settings(&mut session, cmd)? {
                save_session(&session, &mut store)?;
            }
        }
        Command::Process(p) => {
            // Saved first, a failed run still remembers them.
            if apply_process_overrides(&mut session, p) {
                save_session(&session, &mut store)?;
            }
            run_process(&session, p)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(test_name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), test_name)
    }

    fn run_attendance_test(test_name: &str) -> AppResult<Processed> {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = test_dir(test_name);
        info!("Running test {}", test_name);
        let store = JsonFileStore::open(Path::new(&format!("{}/state.json", dir)))?;
        let session = Session::load(&store)?;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        process_attendance(
            &session,
            &format!("{}/attendance.csv", dir),
            &DisplayPolicy::DEFAULT_POLICY,
            today,
        )
    }

    fn test_wrapper(test_name: &str) {
        let processed = run_attendance_test(test_name).unwrap();
        let expected = format!("{}/expected_report.txt", test_dir(test_name));
        if let Err(e) = check_reference(&processed.report, &expected) {
            panic!("{}", e);
        }
    }

    #[test]
    fn google_meet_export() {
        test_wrapper("google_meet_export");
    }

    #[test]
    fn google_meet_export_results() {
        let processed = run_attendance_test("google_meet_export").unwrap();
        assert_eq!(processed.summary.total_count, 6);
        assert_eq!(processed.summary.present_count, 4);
        assert!(matches!(processed.summary.view, ResultsView::Detailed(_)));
        let table = format_results(&processed.summary, &DisplayPolicy::DEFAULT_POLICY);
        assert!(table.starts_with("Present: 4  Absent: 2  Total: 6\n"));
        assert!(table.contains("Alternative"));
    }

    #[test]
    fn missing_columns() {
        let res = run_attendance_test("missing_columns");
        assert!(matches!(
            res,
            Err(AppError::Attendance {
                source: AttendanceError::MissingColumns { .. }
            })
        ));
    }

    #[test]
    fn large_class_view() {
        let processed = run_attendance_test("google_meet_export").unwrap();
        let policy = DisplayPolicy {
            large_class_threshold: 3,
            ..DisplayPolicy::DEFAULT_POLICY
        };
        let summary = results_view(
            &processed.outcome,
            &[
                "Hina Butt".to_string(),
                "Ali Khan".to_string(),
                "Sara Malik".to_string(),
            ],
            &policy,
        );
        let table = format_results(&summary, &policy);
        assert!(table.contains("Large class detected (>3)"));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[3].starts_with("Ali Khan"));
        assert!(lines[3].contains("62.50"));
        assert!(lines[4].starts_with("Hina Butt"));
        assert!(lines[4].ends_with("Absent"));
    }

    #[test]
    fn settings_and_overrides() {
        let mut session = Session::default();
        let values = SettingsValues {
            batch_name: Some("BCR80".to_string()),
            trainer_name: Some("Usman Tariq".to_string()),
            threshold: Some(40.0),
            ..SettingsValues::default()
        };
        apply_settings(&mut session, &values).unwrap();
        assert_eq!(session.trainer_name(), Some("Usman Tariq".to_string()));
        assert_eq!(session.settings().time_threshold_minutes, 40.0);

        let clear = SettingsValues {
            batch_name: Some("".to_string()),
            ..SettingsValues::default()
        };
        apply_settings(&mut session, &clear).unwrap();
        assert_eq!(session.report_settings.batch_name, None);

        let bad = SettingsValues {
            threshold: Some(-1.0),
            ..SettingsValues::default()
        };
        assert!(apply_settings(&mut session, &bad).is_err());

        let p = ProcessArgs {
            input: "x.csv".to_string(),
            out: None,
            reference: None,
            report_date: Some("2024-02-02".to_string()),
            tldv_link: None,
            session_summary: Some("Traits".to_string()),
        };
        assert!(apply_process_overrides(&mut session, &p));
        assert_eq!(
            session.report_settings.report_date,
            Some("2024-02-02".to_string())
        );
        assert_eq!(session.report_settings.tldv_link, None);
    }

    #[test]
    fn roster_commands() {
        let mut session = Session::default();
        assert!(run_roster(
            &mut session,
            &RosterCommand::Add {
                name: "ali khan".to_string()
            }
        )
        .unwrap());
        assert!(run_roster(
            &mut session,
            &RosterCommand::Add {
                name: "Ali Khan (BCR78)".to_string()
            }
        )
        .is_err());
        assert!(run_roster(&mut session, &RosterCommand::Clear { yes: false }).is_err());
        assert_eq!(session.roster.len(), 1);
        assert!(run_roster(
            &mut session,
            &RosterCommand::Remove {
                name: "Ali Khan".to_string()
            }
        )
        .unwrap());
        assert!(session.roster.is_empty());
    }

    #[test]
    fn process_keeps_run_values_when_the_reference_differs() {
        let dir = std::env::temp_dir();
        let state = dir.join("rollcall-process-overrides-state.json");
        let out = dir.join("rollcall-process-overrides-report.txt");
        fs::copy(
            format!("{}/state.json", test_dir("google_meet_export")),
            &state,
        )
        .unwrap();
        let args = Args {
            state: state.display().to_string(),
            verbose: false,
            command: Command::Process(ProcessArgs {
                input: format!("{}/attendance.csv", test_dir("google_meet_export")),
                out: Some(out.display().to_string()),
                reference: Some(format!("{}/attendance.csv", test_dir("missing_columns"))),
                report_date: Some("2024-04-01".to_string()),
                tldv_link: None,
                session_summary: Some("Error handling".to_string()),
            }),
        };
        assert!(matches!(
            run(&args),
            Err(AppError::ReportMismatch { .. })
        ));

        let store = JsonFileStore::open(&state).unwrap();
        let session = Session::load(&store).unwrap();
        assert_eq!(
            session.report_settings.report_date,
            Some("2024-04-01".to_string())
        );
        assert_eq!(
            session.report_settings.session_summary,
            Some("Error handling".to_string())
        );
        assert_eq!(session.roster.len(), 5);
        let report = fs::read_to_string(&out).unwrap();
        assert!(report.contains("Date: 01/04/2024"));
        let _ = fs::remove_file(&state);
        let _ = fs::remove_file(&out);
    }
}
