//! Expiry and timestamp parsing
//!
//! Pendle endpoints encode instants as unix seconds, unix milliseconds or
//! ISO-like strings depending on the listing. Everything is normalised to
//! `DateTime<Utc>` here.

use crate::error::PendleError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Numbers above this are treated as epoch milliseconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// Largest representable instant, in ms either side of the epoch
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Parse a raw expiry value from an API listing.
///
/// Returns `None` when the value cannot be turned into an instant.
pub fn parse_expiry(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Null => None,
        Value::Number(n) => n.as_f64().and_then(from_epoch_number),
        Value::String(s) => parse_expiry_str(s),
        _ => None,
    }
}

/// Parse an expiry that arrived as text
pub fn parse_expiry_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(from_epoch_number);
    }
    if has_space_separated_datetime(s) {
        return parse_datetime_str(&s.replacen(' ', "T", 1));
    }
    parse_datetime_str(s)
}

/// Like [`parse_expiry`] but fails the run with the offending raw value
pub fn resolve_expiry(raw: &Value) -> Result<DateTime<Utc>, PendleError> {
    parse_expiry(raw).ok_or_else(|| {
        let shown = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        PendleError::InvalidInput(format!("Failed to parse expiry: {shown}"))
    })
}

/// Parse a transaction timestamp: epoch milliseconds or a date-time string
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => n.as_f64().and_then(from_epoch_millis),
        Value::String(s) => parse_datetime_str(s.trim()),
        _ => None,
    }
}

/// Parse a date-time string.
///
/// Accepts RFC 3339, RFC 2822, naive date-times (read as UTC) and bare dates
/// (UTC midnight).
pub fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn from_epoch_number(n: f64) -> Option<DateTime<Utc>> {
    if n > MILLIS_THRESHOLD {
        from_epoch_millis(n)
    } else {
        from_epoch_millis(n * 1000.0)
    }
}

fn from_epoch_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() || ms.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(ms.trunc() as i64)
}

/// `YYYY-MM-DD HH:MM:SS` at the start of the string
fn has_space_separated_datetime(s: &str) -> bool {
    const PATTERN: &[u8] = b"dddd-dd-dd dd:dd:dd";
    let bytes = s.as_bytes();
    bytes.len() >= PATTERN.len()
        && PATTERN.iter().zip(bytes).all(|(&p, &b)| match p {
            b'd' => b.is_ascii_digit(),
            other => other == b,
        })
}
