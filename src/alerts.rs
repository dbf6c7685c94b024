//! Alert rules evaluated over a finished analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AlertConfig;
use crate::models::{AnalysisResult, Sentiment, Urgency};

/// How soon someone should look at an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Needs attention now
    High,
    /// Worth a look
    Medium,
}

impl Severity {
    /// Lowercase label used in output and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule that produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A day with unusual overall volume
    VolumeAnomaly,
    /// A day with unusual negative volume
    NegativeSentimentAnomaly,
    /// Many items that are both urgent and negative
    UrgentNegative,
    /// Negative items make up a large share of the batch
    NegativeShare,
}

impl AlertKind {
    /// Snake-case label used in output and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VolumeAnomaly => "volume_anomaly",
            Self::NegativeSentimentAnomaly => "negative_sentiment_anomaly",
            Self::UrgentNegative => "urgent_negative",
            Self::NegativeShare => "negative_share",
        }
    }
}

/// A condition in the analysis that needs attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Rule that fired
    pub kind: AlertKind,
    /// Urgency of the alert
    pub severity: Severity,
    /// One-line summary
    pub title: String,
    /// Longer explanation
    pub description: String,
    /// Day key the alert refers to, for per-day rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Item count that triggered the rule
    pub count: usize,
}

/// Evaluates alert rules against an [`AnalysisResult`]
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: AlertConfig,
}

impl AlertEngine {
    /// Engine with the given thresholds
    #[must_use]
    pub const fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// All alerts raised by `result`
    ///
    /// Anomaly alerts come first, in day order, followed by the batch-wide
    /// rules.
    #[must_use]
    pub fn evaluate(&self, result: &AnalysisResult) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for (day, &count) in &result.anomalies.volume_anomalies {
            alerts.push(Alert {
                kind: AlertKind::VolumeAnomaly,
                severity: Severity::High,
                title: format!("Unusual feedback volume on {day}"),
                description: format!("{count} feedback items received on {day}"),
                day: Some(day.clone()),
                count,
            });
        }

        for (day, &count) in &result.anomalies.negative_sentiment_anomalies {
            alerts.push(Alert {
                kind: AlertKind::NegativeSentimentAnomaly,
                severity: Severity::High,
                title: format!("Spike in negative feedback on {day}"),
                description: format!("{count} negative feedback items received on {day}"),
                day: Some(day.clone()),
                count,
            });
        }

        let urgent_negative = result
            .feedback_data
            .iter()
            .filter(|i| i.urgency == Urgency::High && i.sentiment == Sentiment::Negative)
            .count();
        if urgent_negative >= self.config.urgent_negative_threshold {
            alerts.push(Alert {
                kind: AlertKind::UrgentNegative,
                severity: Severity::High,
                title: format!("High number of urgent negative feedback ({urgent_negative})"),
                description: "Multiple customers have reported urgent negative issues".to_string(),
                day: None,
                count: urgent_negative,
            });
        }

        let total = result.total();
        let negative = result
            .sentiment_summary
            .get(&Sentiment::Negative)
            .copied()
            .unwrap_or(0);
        if total > 0 && total >= self.config.min_items {
            let share = negative as f64 / total as f64;
            if share >= self.config.negative_share_threshold {
                alerts.push(Alert {
                    kind: AlertKind::NegativeShare,
                    severity: Severity::Medium,
                    title: format!("{:.1}% of feedback is negative", share * 100.0),
                    description: format!("{negative} of {total} feedback items are negative"),
                    day: None,
                    count: negative,
                });
            }
        }

        if !alerts.is_empty() {
            tracing::info!(alerts = alerts.len(), "Alerts raised");
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ClassifiedItem, FeedbackItem};
    use chrono::NaiveDate;

    fn classified(sentiment: Sentiment, urgency: Urgency) -> ClassifiedItem {
        let timestamp = NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        ClassifiedItem {
            item: FeedbackItem::new("text", timestamp, "Twitter"),
            sentiment,
            category: Category::Bug,
            urgency,
        }
    }

    fn result_with(items: Vec<ClassifiedItem>) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        for item in &items {
            *result.sentiment_summary.entry(item.sentiment).or_insert(0) += 1;
        }
        result.feedback_data = items;
        result
    }

    #[test]
    fn test_empty_result_raises_nothing() {
        let engine = AlertEngine::new(AlertConfig::default());
        assert!(engine.evaluate(&AnalysisResult::default()).is_empty());
    }

    #[test]
    fn test_anomaly_days_become_high_alerts() {
        let mut result = AnalysisResult::default();
        result
            .anomalies
            .volume_anomalies
            .insert("2023-01-09".to_string(), 20);
        result
            .anomalies
            .negative_sentiment_anomalies
            .insert("2023-01-09".to_string(), 12);

        let alerts = AlertEngine::new(AlertConfig::default()).evaluate(&result);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::VolumeAnomaly);
        assert_eq!(alerts[1].kind, AlertKind::NegativeSentimentAnomaly);
        assert!(alerts.iter().all(|a| a.severity == Severity::High));
        assert_eq!(alerts[0].day.as_deref(), Some("2023-01-09"));
    }

    #[test]
    fn test_urgent_negative_threshold() {
        let engine = AlertEngine::new(AlertConfig {
            min_items: 100,
            ..AlertConfig::default()
        });

        let two = result_with(vec![classified(Sentiment::Negative, Urgency::High); 2]);
        assert!(engine.evaluate(&two).is_empty());

        let three = result_with(vec![classified(Sentiment::Negative, Urgency::High); 3]);
        let alerts = engine.evaluate(&three);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::UrgentNegative);
        assert_eq!(alerts[0].count, 3);
    }

    #[test]
    fn test_negative_share_needs_enough_items() {
        let engine = AlertEngine::new(AlertConfig::default());

        let few = result_with(vec![classified(Sentiment::Negative, Urgency::Low); 4]);
        assert!(engine.evaluate(&few).is_empty());

        let mut items = vec![classified(Sentiment::Negative, Urgency::Low); 3];
        items.extend(vec![classified(Sentiment::Positive, Urgency::Low); 3]);
        let alerts = engine.evaluate(&result_with(items));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::NegativeShare);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].title, "50.0% of feedback is negative");
    }
}
