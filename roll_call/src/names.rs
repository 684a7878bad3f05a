//! Name cleaning, matching keys and batch codes.
//!
//! Two normalizations coexist and must not be mixed up:
//! - [clean_student_name] produces the form that is shown and stored on the roster.
//! - [normalize_for_matching] produces a key that is only used for comparisons.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .map(|(pattern, replacement)| Rule {
            pattern: Regex::new(pattern).expect("Hardcoded name rule pattern"),
            replacement: *replacement,
        })
        .collect()
}

fn apply(rules: &[Rule], input: &str) -> String {
    rules.iter().fold(input.to_string(), |acc, rule| {
        rule.pattern
            .replace_all(&acc, rule.replacement)
            .into_owned()
    })
}

// Batch code tokens, optionally wrapped in parentheses: "(BCR78)", "CMBCR 12", "bcr5".
static BATCH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(?\s*(BCR|CMBCR)\s*[0-9]+\s*\)?").expect("Hardcoded batch token pattern")
});

static BATCH_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(BCR|CMBCR)\s*[0-9]+").expect("Hardcoded batch code pattern"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Hardcoded whitespace pattern"));

// Applied in order on the lowercased name.
static MATCHING_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    rules(&[
        // " cm" suffix that some attendees append to their name
        (r"\s+cm\b", ""),
        ("mohammed", "muhammed"),
        ("mohammad", "muhammed"),
        ("muhammad", "muhammed"),
        (r"\s+", ""),
    ])
});

/// The display form of a name: batch codes removed, whitespace collapsed,
/// title case.
///
/// Applying it to its own output returns the same string.
pub fn clean_student_name(name: &str) -> String {
    // Removing a token can bring two fragments together into a new token.
    let mut stripped = name.to_string();
    loop {
        let next = BATCH_TOKEN.replace_all(&stripped, "").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    to_title_case(collapsed.trim())
}

/// The comparison key of a name.
///
/// Case, whitespace, a trailing "cm" marker and the spellings of Muhammed are
/// not significant. Batch codes are kept: clean the name first if they should
/// not count.
pub fn normalize_for_matching(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    apply(&MATCHING_RULES, &name.to_lowercase())
}

/// Uppercases the first letter of every space-delimited word and lowercases the rest.
pub fn to_title_case(s: &str) -> String {
    s.to_lowercase()
        .split(' ')
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut upper = first.to_uppercase();
            // Letters such as 'ß' expand when uppercased, which would not survive
            // a second pass through to_title_case.
            let head = match (upper.next(), upper.next()) {
                (Some(c), None) => c,
                _ => first,
            };
            let mut res = String::with_capacity(word.len());
            res.push(head);
            res.push_str(chars.as_str());
            res
        }
    }
}

/// The batch code embedded in a name, normalized: "CMBCR 78" gives "BCR78".
pub fn extract_batch_code(name: &str) -> Option<String> {
    BATCH_CODE
        .find(name)
        .map(|m| normalize_batch_code(m.as_str()))
}

fn normalize_batch_code(code: &str) -> String {
    let compact: String = code
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect::<String>()
        .to_uppercase();
    match compact.strip_prefix("CM") {
        Some(rest) => rest.to_string(),
        None => compact,
    }
}

/// Whether the batch code of a name corresponds to the target batch.
///
/// A blank target accepts every name. Partial targets are accepted in both
/// directions, so "BCR7" and "BCR78" match each other.
pub fn matches_batch(student_name: &str, target_batch: &str) -> bool {
    if target_batch.trim().is_empty() {
        return true;
    }
    let student_batch = match extract_batch_code(student_name) {
        Some(b) => b,
        None => return false,
    };
    let target = normalize_batch_code(target_batch);
    debug!(
        "matches_batch: name: {:?} batch: {:?} target: {:?}",
        student_name, student_batch, target
    );
    student_batch == target || student_batch.contains(&target) || target.contains(&student_batch)
}
