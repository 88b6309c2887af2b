//! Typed value extraction from raw log fields.
//!
//! Every extractor is total: a malformed or missing field yields a zero
//! value (`0` or `""`) so one bad field never aborts a parse.

use crate::utils::config::NANOS_PER_MILLI;
use regex::Regex;
use std::sync::LazyLock;

static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bselect\b.*?\bfrom\s+([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)")
        .expect("FROM clause pattern is valid")
});

/// Text between the first `open` and the first `close` after it
fn enclosed(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)? + open.len_utf8();
    let end = start + text[start..].find(close)?;
    Some(text[start..end].trim())
}

/// Extract the timestamp in milliseconds from a timing field.
///
/// `"07:29:05.123 (813678225)"` holds a nanosecond counter in parentheses;
/// the result is `813.678225`.
pub fn extract_timestamp(text: &str) -> f64 {
    enclosed(text, '(', ')')
        .and_then(|nanos| nanos.parse::<f64>().ok())
        .filter(|nanos| nanos.is_finite())
        .map(|nanos| nanos / NANOS_PER_MILLI)
        .unwrap_or(0.0)
}

/// Extract a bracketed line number such as `"[12]"`
pub fn extract_line_number(text: &str) -> u32 {
    enclosed(text, '[', ']')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Extract the object targeted by a SOQL query (first name after `FROM`)
pub fn extract_object(soql: &str) -> String {
    FROM_CLAUSE
        .captures(soql.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extract the count from a `key:value` field such as `"Rows:5"`
pub fn extract_rows(text: &str) -> u64 {
    text.split(':')
        .nth(1)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Value half of a `key:value` field, empty when there is no colon
pub fn extract_value(text: &str) -> String {
    text.split(':').nth(1).unwrap_or_default().to_string()
}

/// Parse a plain integer field, zero when it is not numeric
pub fn extract_count(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}
