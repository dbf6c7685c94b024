//! Validation and normalization of raw feedback records.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;

use crate::error::{FeedbackError, Result};
use crate::models::FeedbackItem;

/// Text used when an item carries no text at all
pub const DEFAULT_TEXT: &str = "No text available";
/// Platform used when an item does not name one
pub const DEFAULT_PLATFORM: &str = "Unknown";

/// Fields the analyzer derives itself; upstream values are discarded
const DERIVED_FIELDS: [&str; 3] = ["sentiment", "category", "urgency"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Validation and normalization of incoming feedback batches
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Locate the record array inside a raw batch
    ///
    /// Accepts a bare array, `{"cleaned_data": [...]}` or
    /// `{"data": {"cleaned_data": [...]}}`.
    pub fn extract_records(batch: &Value) -> Result<&[Value]> {
        let records = match batch {
            Value::Array(records) => Some(records),
            Value::Object(envelope) => envelope
                .get("cleaned_data")
                .or_else(|| envelope.get("data").and_then(|d| d.get("cleaned_data")))
                .and_then(Value::as_array),
            _ => None,
        };

        records.map(Vec::as_slice).ok_or_else(|| {
            FeedbackError::InvalidInput("batch is not an array of feedback records".to_string())
        })
    }

    /// Turn a raw record into a [`FeedbackItem`]
    ///
    /// Missing text becomes [`DEFAULT_TEXT`], a missing platform becomes
    /// [`DEFAULT_PLATFORM`], and a missing or unparseable timestamp becomes
    /// `now`.
    #[must_use]
    pub fn normalize_record(record: &Map<String, Value>, now: NaiveDateTime) -> FeedbackItem {
        let text = match record.get("text") {
            None | Some(Value::Null) => DEFAULT_TEXT.to_string(),
            Some(value) => Self::sanitize_text(&value_to_string(value)),
        };

        let platform = match record.get("platform") {
            None | Some(Value::Null) => DEFAULT_PLATFORM.to_string(),
            Some(value) => value_to_string(value),
        };

        let timestamp = match record.get("timestamp") {
            None | Some(Value::Null) => {
                tracing::debug!("Feedback item has no timestamp, using current time");
                now
            }
            Some(value) => Self::parse_timestamp(value).unwrap_or_else(|| {
                tracing::warn!(timestamp = %value, "Unparseable timestamp, using current time");
                now
            }),
        };

        let extra = record
            .iter()
            .filter(|(key, _)| {
                !matches!(key.as_str(), "text" | "platform" | "timestamp")
                    && !DERIVED_FIELDS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        FeedbackItem {
            text,
            timestamp,
            platform,
            extra,
        }
    }

    /// Parse the timestamp representations seen in collected feedback
    ///
    /// Strings may be RFC 3339 (converted to UTC), a date-time, or a bare
    /// date (midnight). Integers are Unix seconds. Years outside 1..=9999
    /// are rejected.
    #[must_use]
    pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
        let parsed = match value {
            Value::String(raw) => Self::parse_timestamp_str(raw.trim()),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc()),
            _ => None,
        }?;

        Self::in_supported_range(&parsed).then_some(parsed)
    }

    /// Whether `timestamp` has a year in 1..=9999
    ///
    /// Outside that range day keys stop sorting as strings and the ISO
    /// serialization no longer parses back.
    #[must_use]
    pub fn in_supported_range(timestamp: &NaiveDateTime) -> bool {
        (1..=9999).contains(&timestamp.year())
    }

    fn parse_timestamp_str(raw: &str) -> Option<NaiveDateTime> {
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    /// Sanitize text input
    ///
    /// Applies NFC normalization and strips control characters other than
    /// newlines and tabs.
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.nfc()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid date")
    }

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_extract_records_envelopes() {
        let bare = json!([{"text": "a"}]);
        assert_eq!(InputValidator::extract_records(&bare).map(<[Value]>::len).ok(), Some(1));

        let wrapped = json!({"cleaned_data": [{"text": "a"}, {"text": "b"}]});
        assert_eq!(InputValidator::extract_records(&wrapped).map(<[Value]>::len).ok(), Some(2));

        let nested = json!({"status": "success", "data": {"cleaned_data": []}});
        assert_eq!(InputValidator::extract_records(&nested).map(<[Value]>::len).ok(), Some(0));

        assert!(InputValidator::extract_records(&json!("nope")).is_err());
        assert!(InputValidator::extract_records(&json!({"rows": []})).is_err());
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let item = InputValidator::normalize_record(&record(json!({"likes": 3})), now());
        assert_eq!(item.text, DEFAULT_TEXT);
        assert_eq!(item.platform, DEFAULT_PLATFORM);
        assert_eq!(item.timestamp, now());
        assert_eq!(item.extra.get("likes"), Some(&json!(3)));
    }

    #[test]
    fn test_normalize_drops_upstream_labels() {
        let item = InputValidator::normalize_record(
            &record(json!({"text": "ok", "sentiment": "positive", "source": "social"})),
            now(),
        );
        assert!(!item.extra.contains_key("sentiment"));
        assert_eq!(item.extra.get("source"), Some(&json!("social")));
    }

    #[test]
    fn test_normalize_stringifies_non_string_text() {
        let item = InputValidator::normalize_record(&record(json!({"text": 42, "platform": 7})), now());
        assert_eq!(item.text, "42");
        assert_eq!(item.platform, "7");
    }

    #[test]
    fn test_unparseable_timestamp_uses_now() {
        let item = InputValidator::normalize_record(
            &record(json!({"text": "hi", "timestamp": "yesterday-ish"})),
            now(),
        );
        assert_eq!(item.timestamp, now());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid date");

        for raw in [
            "2023-01-15 10:30:00",
            "2023-01-15T10:30:00",
            "2023-01-15T10:30:00Z",
            "2023-01-15T12:30:00+02:00",
            "2023-01-15 10:30",
        ] {
            assert_eq!(
                InputValidator::parse_timestamp(&json!(raw)),
                Some(expected),
                "failed for {raw}"
            );
        }

        let midnight = InputValidator::parse_timestamp(&json!("2023-01-15"));
        assert_eq!(midnight.map(|t| t.date()), Some(expected.date()));

        assert_eq!(
            InputValidator::parse_timestamp(&json!(1_673_778_600)),
            Some(expected)
        );
        assert_eq!(InputValidator::parse_timestamp(&json!(true)), None);
        assert_eq!(InputValidator::parse_timestamp(&json!("")), None);
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(InputValidator::sanitize_text("  hello\u{0000} world  "), "hello world");
        assert_eq!(InputValidator::sanitize_text("line\nbreak"), "line\nbreak");
    }
}
