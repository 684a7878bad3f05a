//! The text report shared with the class after a session.

use std::fmt::Write;

use crate::config::{AlternativeStudent, DisplayPolicy, Outcome, ReportMeta};

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn numbered_list<'a>(output: &mut String, names: impl Iterator<Item = &'a str>) {
    for (idx, name) in names.enumerate() {
        let _ = writeln!(output, "{}. {}", idx + 1, name);
    }
}

/// The names under which alternative students are listed.
///
/// With few attendees the original names, batch codes included, are shown.
pub fn alternative_display_names<'a>(
    alternatives: &'a [AlternativeStudent],
    present_count: usize,
    policy: &DisplayPolicy,
) -> Vec<&'a str> {
    let show_batch_codes =
        present_count + alternatives.len() < policy.batch_code_display_threshold;
    alternatives
        .iter()
        .map(|a| {
            if show_batch_codes {
                a.original_name.as_str()
            } else {
                a.clean_name.as_str()
            }
        })
        .collect()
}

/// Renders the session report.
///
/// Sections appear in a fixed order and are left out when they would be
/// empty. Alternative students are only reported for classes that are not
/// larger than the policy's size threshold.
pub fn compose(outcome: &Outcome, meta: &ReportMeta, policy: &DisplayPolicy) -> String {
    let mut output = String::new();

    let _ = write!(output, "🗒 Session Report\n\n");

    if let Some(batch) = field(&meta.batch_name) {
        let _ = writeln!(output, "Batch: {}", batch);
    }
    if let Some(date) = meta.report_date {
        let _ = writeln!(output, "Date: {}", date.format("%d/%m/%Y"));
    }
    if let Some(coordinators) = field(&meta.coordinators) {
        let _ = writeln!(output, "Coordinators: {}", coordinators);
    }
    if let Some(creator) = field(&meta.report_creator) {
        let _ = writeln!(output, "Report by: {}", creator);
    }

    if let Some(link) = field(&meta.tldv_link) {
        let _ = write!(output, "\n\n🎥 TL;DV:\n{}", link);
    }

    if let Some(summary) = field(&meta.session_summary) {
        let _ = write!(output, "\n\n\n📝 Today's Session Summary:\n\n{}", summary);
    }

    if !outcome.present.is_empty() {
        let _ = write!(output, "\n\n\n👥 Participants Present:\n\n");
        numbered_list(&mut output, outcome.present.iter().map(String::as_str));
    }

    if !outcome.alternatives.is_empty()
        && outcome.records.len() <= policy.large_class_threshold
    {
        let _ = write!(output, "\n\n⚠️ Alternative Students (Not in Main List):\n\n");
        let display =
            alternative_display_names(&outcome.alternatives, outcome.present.len(), policy);
        numbered_list(&mut output, display.into_iter());
    }

    if !outcome.absent.is_empty() {
        let _ = write!(output, "\n\n\n❌ Absentees:\n\n");
        numbered_list(&mut output, outcome.absent.iter().map(String::as_str));
    }

    output
}
