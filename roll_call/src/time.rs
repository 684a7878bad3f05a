use crate::config::Cell;

/// Converts the content of a "time in call" cell into minutes.
///
/// Accepted forms, in order: a plain number of minutes, `H:M:S`, `M:S`.
/// Anything else counts as 0 minutes, and so does each unreadable segment of
/// a colon-separated value.
pub fn parse_time_to_minutes(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) => 0.0,
        Cell::Text(s) => parse_time_str(s),
    }
}

pub fn parse_time_str(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Ok(x) = s.parse::<f64>() {
        if x.is_finite() {
            return x;
        }
    }
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [h, m, sec] => leading_int(h) * 60.0 + leading_int(m) + leading_int(sec) / 60.0,
        [m, sec] => leading_int(m) + leading_int(sec) / 60.0,
        _ => 0.0,
    }
}

// The integer prefix of a segment ("07s" is 7), or 0 if there is none.
fn leading_int(segment: &str) -> f64 {
    let s = segment.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<f64>()
        .map(|x| sign * x)
        .unwrap_or(0.0)
}
