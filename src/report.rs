//! Summary report built from an analysis and its alerts.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::alerts::Alert;
use crate::models::{AnalysisResult, Category, Sentiment, Urgency};

/// Headline numbers for a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Items in the batch
    pub total_feedbacks: usize,
    /// Positive items
    pub positive_feedbacks: usize,
    /// Negative items
    pub negative_feedbacks: usize,
    /// Neutral items
    pub neutral_feedbacks: usize,
    /// Items with high urgency
    pub urgent_issues: usize,
    /// Items categorized as feature requests
    pub feature_requests: usize,
    /// Items categorized as bugs
    pub bugs_reported: usize,
    /// Share of positive items, in percent with one decimal
    pub positive_percentage: f64,
    /// Share of negative items, in percent with one decimal
    pub negative_percentage: f64,
    /// Share of neutral items, in percent with one decimal
    pub neutral_percentage: f64,
}

impl Kpis {
    /// KPIs for `result`; percentages are 0 for an empty batch
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let sentiment = |s: Sentiment| result.sentiment_summary.get(&s).copied().unwrap_or(0);
        let category = |c: Category| result.top_issues.get(&c).copied().unwrap_or(0);
        let total = result.total();

        let mut kpis = Self {
            total_feedbacks: total,
            positive_feedbacks: sentiment(Sentiment::Positive),
            negative_feedbacks: sentiment(Sentiment::Negative),
            neutral_feedbacks: sentiment(Sentiment::Neutral),
            urgent_issues: result
                .feedback_data
                .iter()
                .filter(|i| i.urgency == Urgency::High)
                .count(),
            feature_requests: category(Category::FeatureRequest),
            bugs_reported: category(Category::Bug),
            ..Self::default()
        };

        if total > 0 {
            kpis.positive_percentage = percentage(kpis.positive_feedbacks, total);
            kpis.negative_percentage = percentage(kpis.negative_feedbacks, total);
            kpis.neutral_percentage = percentage(kpis.neutral_feedbacks, total);
        }
        kpis
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Everything a reader needs from one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Headline numbers
    pub kpis: Kpis,
    /// Most frequent category, ties resolved in category order
    pub top_category: Option<Category>,
    /// Batch keywords
    pub keywords: Vec<String>,
    /// First and last day observed
    pub date_range: Option<(String, String)>,
    /// Days flagged for overall volume
    pub volume_anomaly_days: usize,
    /// Days flagged for negative volume
    pub negative_anomaly_days: usize,
    /// Alerts raised for this run
    pub alerts: Vec<Alert>,
}

impl SummaryReport {
    /// Report for `result` and the alerts raised on it
    #[must_use]
    pub fn build(result: &AnalysisResult, alerts: &[Alert]) -> Self {
        // max_by_key keeps the last maximum, so walk categories in reverse
        let top_category = result
            .top_issues
            .iter()
            .rev()
            .max_by_key(|(_, &count)| count)
            .map(|(category, _)| *category);

        let daily = &result.time_trends.daily_count;
        let date_range = daily
            .first()
            .zip(daily.last())
            .map(|(first, last)| (first.day.clone(), last.day.clone()));

        Self {
            kpis: Kpis::from_result(result),
            top_category,
            keywords: result.trend_keywords.clone(),
            date_range,
            volume_anomaly_days: result.anomalies.volume_anomalies.len(),
            negative_anomaly_days: result.anomalies.negative_sentiment_anomalies.len(),
            alerts: alerts.to_vec(),
        }
    }

    /// Plain-text rendering of the report
    #[must_use]
    pub fn render_text(&self) -> String {
        let k = &self.kpis;
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "Feedback Analysis Report");
        let _ = writeln!(out, "========================");
        if let Some((first, last)) = &self.date_range {
            let _ = writeln!(out, "Period: {first} to {last}");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Total feedback:   {}", k.total_feedbacks);
        let _ = writeln!(
            out,
            "Positive:         {} ({:.1}%)",
            k.positive_feedbacks, k.positive_percentage
        );
        let _ = writeln!(
            out,
            "Negative:         {} ({:.1}%)",
            k.negative_feedbacks, k.negative_percentage
        );
        let _ = writeln!(
            out,
            "Neutral:          {} ({:.1}%)",
            k.neutral_feedbacks, k.neutral_percentage
        );
        let _ = writeln!(out, "Urgent issues:    {}", k.urgent_issues);
        let _ = writeln!(out, "Bugs reported:    {}", k.bugs_reported);
        let _ = writeln!(out, "Feature requests: {}", k.feature_requests);

        if let Some(category) = self.top_category {
            let _ = writeln!(out, "Top category:     {category}");
        }
        if !self.keywords.is_empty() {
            let _ = writeln!(out, "Keywords:         {}", self.keywords.join(", "));
        }
        let _ = writeln!(
            out,
            "Anomalous days:   {} volume, {} negative",
            self.volume_anomaly_days, self.negative_anomaly_days
        );

        let _ = writeln!(out);
        if self.alerts.is_empty() {
            let _ = writeln!(out, "No alerts.");
        } else {
            let _ = writeln!(out, "Alerts ({}):", self.alerts.len());
            for alert in &self.alerts {
                let _ = writeln!(out, "  [{}] {}", alert.severity, alert.title);
            }
        }

        out
    }
}
