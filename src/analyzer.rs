//! Batch analysis entry point.
//!
//! [`Analyzer`] normalizes a raw batch, labels every item, and runs keyword
//! extraction, trend aggregation and anomaly detection independently. A
//! failing sub-component contributes its empty form; `analyze` itself
//! always returns a valid [`AnalysisResult`].

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::anomaly::AnomalyDetector;
use crate::classifier::{scorer_from_config, TextClassifier};
use crate::clock::{Clock, SystemClock};
use crate::config::AnalysisConfig;
use crate::keywords::KeywordExtractor;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{AnalysisResult, ClassifiedItem, FeedbackItem};
use crate::trends::TrendAggregator;
use crate::validation::InputValidator;

/// Runs the full analysis over one batch at a time
pub struct Analyzer {
    classifier: TextClassifier,
    keywords: KeywordExtractor,
    trends: TrendAggregator,
    anomalies: AnomalyDetector,
    clock: Box<dyn Clock>,
    metrics: MetricsCollector,
}

impl Analyzer {
    /// Build an analyzer from configuration, using the system clock
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let classifier = TextClassifier::new(scorer_from_config(config)?)?;
        let keywords = KeywordExtractor::new(config.keyword_top_n, config.keyword_min_batch)?;

        Ok(Self {
            classifier,
            keywords,
            trends: TrendAggregator,
            anomalies: AnomalyDetector::new(config.anomaly_sigma, config.anomaly_min_days),
            clock: Box::new(SystemClock),
            metrics: MetricsCollector::default(),
        })
    }

    /// Replace the source of "now" used for missing timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the item classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: TextClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// The classifier used for per-item labels
    #[must_use]
    pub const fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    /// Label a single text, stamped with the analyzer's clock
    pub fn classify_one(&self, text: &str) -> ClassifiedItem {
        let item = FeedbackItem::new(
            InputValidator::sanitize_text(text),
            self.clock.now(),
            "cli",
        );
        self.classifier.classify(item)
    }

    /// Analyze a raw JSON batch
    ///
    /// Accepts a bare array or a `cleaned_data` envelope. Anything else
    /// yields the canonical empty result.
    pub fn analyze_value(&self, batch: &Value) -> AnalysisResult {
        match InputValidator::extract_records(batch) {
            Ok(records) => self.analyze(records),
            Err(e) => {
                warn!(error = %e, "Malformed feedback batch, returning empty analysis");
                self.metrics
                    .record_analysis(0, std::time::Duration::ZERO, "empty");
                AnalysisResult::default()
            }
        }
    }

    /// Analyze a batch of raw feedback records
    ///
    /// Records that are not JSON objects are skipped.
    pub fn analyze(&self, batch: &[Value]) -> AnalysisResult {
        if batch.is_empty() {
            return self.analyze_items(Vec::new());
        }

        let now = self.clock.now();
        let items: Vec<FeedbackItem> = batch
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                if let Value::Object(fields) = record {
                    Some(InputValidator::normalize_record(fields, now))
                } else {
                    warn!(index, "Skipping feedback record that is not an object");
                    None
                }
            })
            .collect();

        self.metrics.record_skipped(batch.len() - items.len());
        self.analyze_items(items)
    }

    /// Analyze already normalized items
    ///
    /// Timestamps with a year outside 1..=9999 are replaced with the clock's
    /// current time, as [`InputValidator::normalize_record`] does.
    pub fn analyze_items(&self, mut items: Vec<FeedbackItem>) -> AnalysisResult {
        let timer = OperationTimer::new("analyze");

        if items.is_empty() {
            debug!("Empty batch, returning empty analysis");
            self.metrics.record_analysis(0, timer.elapsed(), "empty");
            return AnalysisResult::default();
        }

        info!(
            items = items.len(),
            scorer = self.classifier.scorer_name(),
            "Analyzing feedback batch"
        );

        let mut now = None;
        for (index, item) in items.iter_mut().enumerate() {
            if !InputValidator::in_supported_range(&item.timestamp) {
                warn!(
                    index,
                    timestamp = %item.timestamp,
                    "Timestamp out of supported range, using current time"
                );
                item.timestamp = *now.get_or_insert_with(|| self.clock.now());
            }
        }

        let feedback_data: Vec<ClassifiedItem> = items
            .into_iter()
            .map(|item| self.classifier.classify(item))
            .collect();

        let result = self.assemble(feedback_data);

        info!(
            items = result.total(),
            keywords = result.trend_keywords.len(),
            days = result.time_trends.daily_count.len(),
            volume_anomalies = result.anomalies.volume_anomalies.len(),
            negative_anomalies = result.anomalies.negative_sentiment_anomalies.len(),
            "Analysis complete"
        );
        self.metrics
            .record_analysis(result.total(), timer.elapsed(), "complete");

        result
    }

    /// Summaries plus the independent keyword, trend and anomaly steps
    fn assemble(&self, feedback_data: Vec<ClassifiedItem>) -> AnalysisResult {
        let mut sentiment_summary = BTreeMap::new();
        let mut top_issues = BTreeMap::new();
        for item in &feedback_data {
            *sentiment_summary.entry(item.sentiment).or_insert(0) += 1;
            *top_issues.entry(item.category).or_insert(0) += 1;
        }

        let texts: Vec<&str> = feedback_data.iter().map(|c| c.item.text.as_str()).collect();
        let trend_keywords = self.degrade("keywords", self.keywords.extract(&texts));
        let time_trends = self.degrade("trends", self.trends.aggregate(&feedback_data));
        let anomalies = self.degrade("anomalies", self.anomalies.detect(&feedback_data));

        AnalysisResult {
            feedback_data,
            sentiment_summary,
            top_issues,
            trend_keywords,
            time_trends,
            anomalies,
        }
    }

    fn degrade<T: Default>(&self, component: &'static str, outcome: crate::Result<T>) -> T {
        outcome.unwrap_or_else(|e| {
            warn!(component, error = %e, "Analysis component failed, using empty result");
            self.metrics.record_degraded(component);
            T::default()
        })
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("classifier", &self.classifier)
            .field("keywords", &self.keywords)
            .field("anomalies", &self.anomalies)
            .finish_non_exhaustive()
    }
}
