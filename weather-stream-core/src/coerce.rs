//! Scalar converters that never fail.
//!
//! Upstream values arrive as whatever JSON the provider chose to send. Each
//! converter returns `None` when the input is missing or can't be read as the
//! target type, so a single bad field never takes down the whole record.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::access::Field;

/// Pattern the provider uses for `location.localtime`, e.g. `2024-06-01 8:00`.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Normalized timestamp layout for every date-time field in a record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `input` against `format` and re-render it as [`TIMESTAMP_FORMAT`].
///
/// chrono lets a space in the format match no whitespace at all and skips
/// whitespace ahead of numbers. Here every space in `format` needs at least
/// one whitespace character in `input`, and whitespace is allowed nowhere
/// else.
pub(crate) fn reformat_timestamp(input: &str, format: &str) -> Option<String> {
    if input.starts_with(char::is_whitespace) || input.ends_with(char::is_whitespace) {
        return None;
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() != format.split(' ').count() {
        return None;
    }

    NaiveDateTime::parse_from_str(&parts.join(" "), format)
        .ok()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// `YYYY-MM-DD HH:MM` → `YYYY-MM-DD HH:MM:SS`.
pub fn safe_datetime(field: Field<'_>) -> Option<String> {
    reformat_timestamp(field.text()?, LOCAL_TIME_FORMAT)
}

/// Numbers pass through; numeric strings are parsed.
pub fn safe_float(field: Field<'_>) -> Option<f64> {
    match field.value()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parsed as a float first and truncated toward zero, so `"55.7"` is `55`.
pub fn safe_int(field: Field<'_>) -> Option<i64> {
    if let Some(i) = field.value().and_then(Value::as_i64) {
        return Some(i);
    }

    let f = safe_float(field)?.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 { Some(f as i64) } else { None }
}
