//! Shared utility functions used across multiple modules.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Current Unix timestamp in milliseconds.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse an event date from a heterogeneous JSON value into Unix milliseconds.
///
/// Backends deliver dates as ISO-8601 strings, raw epoch numbers, or a
/// Mongo-style `{"$date": ...}` wrapper (optionally nesting `$numberLong`).
/// Any value that cannot be interpreted yields `0` ("epoch/unknown") instead
/// of an error, so a single bad record never poisons a whole collection.
pub fn parse_event_date(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .unwrap_or(0),
        Value::String(text) => parse_date_text(text),
        Value::Object(map) => map.get("$date").map_or(0, parse_mongo_date),
        _ => 0,
    }
}

fn parse_mongo_date(inner: &Value) -> i64 {
    match inner {
        Value::String(text) => parse_date_text(text),
        Value::Number(number) => number.as_i64().unwrap_or(0),
        Value::Object(map) => map
            .get("$numberLong")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

fn parse_date_text(text: &str) -> i64 {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.timestamp_millis();
    }
    // Naive variants without an offset are interpreted as UTC.
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.and_utc().timestamp_millis();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return parsed
            .and_hms_opt(0, 0, 0)
            .map_or(0, |midnight| midnight.and_utc().timestamp_millis());
    }
    0
}
