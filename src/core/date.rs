//! Date key normalization and display formatting.
//!
//! Dates travel as `YYYY-MM-DD` strings. Upstream sources sometimes append a time of
//! day, so every incoming date is trimmed and cut to its first ten characters before it
//! is compared or stored. For such keys lexical order equals chronological order.

use crate::errors::{Error, Result};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes a date-like string to its `YYYY-MM-DD` prefix.
///
/// Idempotent: `normalize_date(&normalize_date(s)) == normalize_date(s)`.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    raw.trim().chars().take(10).collect()
}

/// The `YYYY-MM` month key of a date-like string.
#[must_use]
pub fn month_key(raw: &str) -> String {
    normalize_date(raw).chars().take(7).collect()
}

/// Whether the normalized date falls in `month` (`YYYY-MM`).
#[must_use]
pub fn in_month(raw: &str, month: &str) -> bool {
    month_key(raw) == month.trim()
}

/// Parses a date-like string as a calendar date after normalization.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let normalized = normalize_date(raw);
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT)
        .map_err(|_| Error::validation(format!("'{}' is not a valid date (YYYY-MM-DD)", raw.trim())))
}

/// Parses and re-formats a date-like string, yielding the canonical zero-padded key
/// used for storage.
pub fn canonical_date(raw: &str) -> Result<String> {
    Ok(parse_date(raw)?.format(DATE_FORMAT).to_string())
}

/// Validates a `YYYY-MM` month key.
pub fn parse_month(raw: &str) -> Result<String> {
    let month = raw.trim();
    let invalid = || Error::validation(format!("'{month}' is not a valid month (YYYY-MM)"));

    if month.len() != 7 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&format!("{month}-01"), DATE_FORMAT)
        .map(|_| month.to_string())
        .map_err(|_| invalid())
}

/// Formats a date for display, e.g. `"10 Jan 2024"`. Unparseable input is shown
/// normalized rather than rejected.
#[must_use]
pub fn format_display_date(raw: &str) -> String {
    parse_date(raw).map_or_else(
        |_| normalize_date(raw),
        |date| date.format("%d %b %Y").to_string(),
    )
}

/// Today's date key in local time.
#[must_use]
pub fn today_key() -> String {
    chrono::Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// The current month key in local time.
#[must_use]
pub fn current_month_key() -> String {
    month_key(&today_key())
}
