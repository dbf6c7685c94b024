//! Loading feedback records from collected JSON and CSV files.
//!
//! Records come back as raw JSON objects; [`crate::analyzer::Analyzer`]
//! does the normalization. Loading only strips personal fields and applies
//! the optional preprocessing switches.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ProcessingConfig;
use crate::error::{FeedbackError, Result};

/// Fields removed from every record before analysis
pub const PERSONAL_FIELDS: [&str; 11] = [
    "user_name",
    "user_id",
    "reviewer_name",
    "email",
    "phone_number",
    "phone",
    "location",
    "media_url",
    "name",
    "personal_info",
    "address",
];

/// Envelope keys holding record arrays, with the source they imply
const ENVELOPE_KEYS: [(&str, Option<&str>); 4] = [
    ("cleaned_data", None),
    ("social_data", Some("social")),
    ("survey_responses", Some("survey")),
    ("reviews", Some("review")),
];

/// Reads feedback files and prepares their records for analysis
#[derive(Debug, Clone, Default)]
pub struct FeedbackLoader {
    processing: ProcessingConfig,
}

impl FeedbackLoader {
    /// Loader applying `processing` to every record
    #[must_use]
    pub const fn new(processing: ProcessingConfig) -> Self {
        Self { processing }
    }

    /// Load every record under `paths`, in the order given
    pub fn load_paths(&self, paths: &[PathBuf]) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        for path in paths {
            records.extend(self.load_path(path)?);
        }
        Ok(records)
    }

    /// Load a file, or every supported file in a directory
    ///
    /// Directory entries are read in file name order; unsupported files are
    /// skipped.
    pub fn load_path(&self, path: &Path) -> Result<Vec<Value>> {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();

            let mut records = Vec::new();
            for file in files {
                if FileKind::from_path(&file).is_some() {
                    records.extend(self.load_file(&file)?);
                } else {
                    debug!(path = %file.display(), "Skipping unsupported file");
                }
            }
            Ok(records)
        } else {
            self.load_file(path)
        }
    }

    /// Load and prepare the records of a single file
    pub fn load_file(&self, path: &Path) -> Result<Vec<Value>> {
        let raw = match FileKind::from_path(path) {
            Some(FileKind::Json) => read_json(path)?,
            Some(FileKind::Csv) => read_csv(path)?,
            None => {
                return Err(FeedbackError::UnsupportedFormat(path.display().to_string()));
            }
        };

        info!(path = %path.display(), records = raw.len(), "Loaded feedback file");
        Ok(self.prepare(raw))
    }

    /// Sanitize and preprocess object records; other values pass through
    #[must_use]
    pub fn prepare(&self, records: Vec<Value>) -> Vec<Value> {
        records
            .into_iter()
            .map(|record| match record {
                Value::Object(mut fields) => {
                    sanitize(&mut fields, self.processing.strip_personal_fields);
                    preprocess(&mut fields, &self.processing);
                    Value::Object(fields)
                }
                other => other,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Json,
    Csv,
}

impl FileKind {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Records from a JSON file
///
/// The file holds either an array of records or an object with one of the
/// collector envelope keys. Records from a `social_data`, `survey_responses`
/// or `reviews` envelope get a `source` field unless they already have one.
pub fn read_json(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    records_from_json(value)
        .ok_or_else(|| FeedbackError::InvalidInput(format!("{}: no feedback records", path.display())))
}

fn records_from_json(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(records) => Some(records),
        Value::Object(mut envelope) => {
            for (key, source) in ENVELOPE_KEYS {
                if let Some(Value::Array(records)) = envelope.remove(key) {
                    return Some(tag_source(records, source));
                }
            }
            envelope.remove("data").and_then(records_from_json)
        }
        _ => None,
    }
}

fn tag_source(records: Vec<Value>, source: Option<&str>) -> Vec<Value> {
    let Some(source) = source else {
        return records;
    };
    records
        .into_iter()
        .map(|mut record| {
            if let Value::Object(fields) = &mut record {
                fields
                    .entry("source")
                    .or_insert_with(|| Value::from(source));
            }
            record
        })
        .collect()
}

/// Records from a CSV file with a header row
///
/// Every cell is a string; empty cells become `null`.
pub fn read_csv(path: &Path) -> Result<Vec<Value>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::from(cell)
                };
                (header.to_string(), value)
            })
            .collect();
        records.push(Value::Object(fields));
    }
    Ok(records)
}

/// Clean one collected record
///
/// Removes [`PERSONAL_FIELDS`] when `strip_personal` is set, uses a
/// `feedback` or `review` string as `text` when `text` is missing, and
/// makes `rating` numeric (0 when it does not parse).
pub fn sanitize(record: &mut Map<String, Value>, strip_personal: bool) {
    if strip_personal {
        for field in PERSONAL_FIELDS {
            record.remove(field);
        }
    }

    if !matches!(record.get("text"), Some(Value::String(_))) {
        let fallback = ["feedback", "review"]
            .iter()
            .find_map(|key| record.get(*key).and_then(Value::as_str).map(str::to_string));
        if let Some(text) = fallback {
            record.insert("text".to_string(), Value::from(text));
        }
    }

    if let Some(rating) = record.get_mut("rating") {
        if !rating.is_number() {
            let parsed = rating
                .as_str()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .and_then(serde_json::Number::from_f64)
                .map_or_else(|| Value::from(0), Value::Number);
            *rating = parsed;
        }
    }
}

/// Apply the optional text and platform normalization
pub fn preprocess(record: &mut Map<String, Value>, config: &ProcessingConfig) {
    if config.lowercase_text {
        if let Some(Value::String(text)) = record.get_mut("text") {
            *text = text.to_lowercase();
        }
    }
    if config.normalize_platform {
        if let Some(Value::String(platform)) = record.get_mut("platform") {
            *platform = platform.trim().to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_sanitize_strips_personal_fields() {
        let mut record = fields(json!({
            "text": "Great app",
            "user_name": "jdoe",
            "email": "j@example.com",
            "likes": 4
        }));
        sanitize(&mut record, true);
        assert!(!record.contains_key("user_name"));
        assert!(!record.contains_key("email"));
        assert_eq!(record.get("likes"), Some(&json!(4)));
    }

    #[test]
    fn test_sanitize_keeps_fields_when_disabled() {
        let mut record = fields(json!({"text": "ok", "email": "j@example.com"}));
        sanitize(&mut record, false);
        assert!(record.contains_key("email"));
    }

    #[test]
    fn test_sanitize_text_fallback_and_rating() {
        let mut record = fields(json!({"feedback": "Checkout is slow", "rating": "4.5"}));
        sanitize(&mut record, true);
        assert_eq!(record.get("text"), Some(&json!("Checkout is slow")));
        assert_eq!(record.get("rating"), Some(&json!(4.5)));

        let mut record = fields(json!({"review": "meh", "rating": "five"}));
        sanitize(&mut record, true);
        assert_eq!(record.get("text"), Some(&json!("meh")));
        assert_eq!(record.get("rating"), Some(&json!(0)));
    }

    #[test]
    fn test_preprocess_switches() {
        let config = ProcessingConfig {
            lowercase_text: true,
            normalize_platform: true,
            ..ProcessingConfig::default()
        };
        let mut record = fields(json!({"text": "LOUD Text", "platform": "  Twitter "}));
        preprocess(&mut record, &config);
        assert_eq!(record.get("text"), Some(&json!("loud text")));
        assert_eq!(record.get("platform"), Some(&json!("twitter")));

        let mut untouched = fields(json!({"text": "LOUD"}));
        preprocess(&mut untouched, &ProcessingConfig::default());
        assert_eq!(untouched.get("text"), Some(&json!("LOUD")));
    }

    #[test]
    fn test_envelopes_tag_source() {
        let records = records_from_json(json!({
            "social_data": [{"text": "a"}, {"text": "b", "source": "import"}]
        }))
        .expect("records");
        assert_eq!(records[0]["source"], "social");
        assert_eq!(records[1]["source"], "import");

        let nested = records_from_json(json!({"data": {"cleaned_data": [{"text": "c"}]}}))
            .expect("records");
        assert_eq!(nested.len(), 1);
        assert!(nested[0].get("source").is_none());

        assert!(records_from_json(json!({"status": "ok"})).is_none());
    }

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::from_path(Path::new("a/b.JSON")), Some(FileKind::Json));
        assert_eq!(FileKind::from_path(Path::new("b.csv")), Some(FileKind::Csv));
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("README")), None);
    }
}
