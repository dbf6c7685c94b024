//! Data models for feedback analysis
//!
//! This module contains the data structures that flow through the pipeline:
//! raw feedback items, their classified form, and the aggregated analysis
//! result handed to alerting and reporting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Text form used for every timestamp leaving the analyzer
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Sentiment label for a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Favourable feedback
    Positive,
    /// Unfavourable feedback
    Negative,
    /// Neither, or undecidable
    Neutral,
}

impl Sentiment {
    /// Every sentiment, in column order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Label as it appears in serialized output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic category for a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Defect reports
    Bug,
    /// Requests for new functionality
    FeatureRequest,
    /// Usability complaints
    UxIssue,
    /// Praise
    PositiveFeedback,
    /// Anything else
    Other,
}

impl Category {
    /// Every category, in column order
    pub const ALL: [Self; 5] = [
        Self::Bug,
        Self::FeatureRequest,
        Self::UxIssue,
        Self::PositiveFeedback,
        Self::Other,
    ];

    /// Label as it appears in serialized output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::FeatureRequest => "feature_request",
            Self::UxIssue => "ux_issue",
            Self::PositiveFeedback => "positive_feedback",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage priority derived from category, sentiment and text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Needs attention now
    High,
    /// Should be looked at soon
    Medium,
    /// No action required
    Low,
}

impl Urgency {
    /// Label as it appears in serialized output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized piece of feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    /// Feedback text
    pub text: String,
    /// When the feedback was given
    #[serde(with = "iso_timestamp")]
    pub timestamp: NaiveDateTime,
    /// Source platform (Twitter, Google, survey form, ...)
    pub platform: String,
    /// Any other upstream fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedbackItem {
    /// Create an item without extra fields
    #[must_use]
    pub fn new(text: impl Into<String>, timestamp: NaiveDateTime, platform: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp,
            platform: platform.into(),
            extra: Map::new(),
        }
    }
}

/// A feedback item together with its derived labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    /// The normalized input item
    #[serde(flatten)]
    pub item: FeedbackItem,
    /// Derived sentiment
    pub sentiment: Sentiment,
    /// Derived category
    pub category: Category,
    /// Derived urgency
    pub urgency: Urgency,
}

/// Item count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day key (`YYYY-MM-DD`)
    pub day: String,
    /// Number of items on that day
    pub count: usize,
}

/// Per-day item counts split by sentiment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTrendRow {
    /// Day key (`YYYY-MM-DD`)
    pub day: String,
    /// Positive items on that day
    pub positive: usize,
    /// Negative items on that day
    pub negative: usize,
    /// Neutral items on that day
    pub neutral: usize,
}

/// Per-day item counts split by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTrendRow {
    /// Day key (`YYYY-MM-DD`)
    pub day: String,
    /// Bug reports on that day
    pub bug: usize,
    /// Feature requests on that day
    pub feature_request: usize,
    /// UX issues on that day
    pub ux_issue: usize,
    /// Positive feedback on that day
    pub positive_feedback: usize,
    /// Uncategorized items on that day
    pub other: usize,
}

/// Time-bucketed views over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTrends {
    /// Items per day, ascending by day
    pub daily_count: Vec<DailyCount>,
    /// Items per day and sentiment
    pub sentiment_trend: Vec<SentimentTrendRow>,
    /// Items per day and category
    pub category_trend: Vec<CategoryTrendRow>,
}

impl TimeTrends {
    /// True when no day was observed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily_count.is_empty()
    }
}

/// Days whose volume stands out from the rest of the batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomalies {
    /// Day → item count, for days with unusual overall volume
    pub volume_anomalies: BTreeMap<String, usize>,
    /// Day → negative item count, for days with unusual negative volume
    pub negative_sentiment_anomalies: BTreeMap<String, usize>,
}

impl Anomalies {
    /// True when neither map holds a day
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volume_anomalies.is_empty() && self.negative_sentiment_anomalies.is_empty()
    }
}

/// Complete analysis of one batch
///
/// `AnalysisResult::default()` is the canonical empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Classified items, in input order
    pub feedback_data: Vec<ClassifiedItem>,
    /// Sentiment → count
    pub sentiment_summary: BTreeMap<Sentiment, usize>,
    /// Category → count
    pub top_issues: BTreeMap<Category, usize>,
    /// Representative keywords for the batch
    pub trend_keywords: Vec<String>,
    /// Daily trends
    pub time_trends: TimeTrends,
    /// Anomalous days
    pub anomalies: Anomalies,
}

impl AnalysisResult {
    /// True for the canonical empty result
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Number of analysed items
    #[must_use]
    pub fn total(&self) -> usize {
        self.feedback_data.len()
    }

    /// Serialize into a JSON value
    ///
    /// Falls back to the canonical empty result if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize analysis result");
            serde_json::to_value(Self::default()).unwrap_or(Value::Null)
        })
    }
}

/// Serde adapter writing `NaiveDateTime` as an ISO-8601 string
pub mod iso_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize with [`TIMESTAMP_FORMAT`]
    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    /// Parse a string produced by [`serialize`]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
