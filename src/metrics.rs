//! Metric names and recording helpers for the analysis pipeline.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

use crate::alerts::Alert;

/// Metric names emitted by the analysis pipeline
///
/// Only the `metrics` facade is used here; installing an exporter is up to
/// the embedding application.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Counter of analysis runs, labelled by outcome
    pub analysis_runs_total: &'static str,
    /// Histogram of run durations in seconds
    pub analysis_duration: &'static str,
    /// Gauge of the last batch size
    pub batch_size: &'static str,
    /// Counter of classified items
    pub items_analyzed_total: &'static str,
    /// Counter of records skipped as non-objects
    pub records_skipped_total: &'static str,
    /// Counter of degraded sub-components, labelled by component
    pub degraded_components_total: &'static str,
    /// Counter of alerts, labelled by severity and kind
    pub alerts_raised_total: &'static str,
    /// Counter of output files written
    pub files_written_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            analysis_runs_total: "feedback_analysis_runs_total",
            analysis_duration: "feedback_analysis_duration_seconds",
            batch_size: "feedback_analysis_batch_size",
            items_analyzed_total: "feedback_items_analyzed_total",
            records_skipped_total: "feedback_records_skipped_total",
            degraded_components_total: "feedback_degraded_components_total",
            alerts_raised_total: "feedback_alerts_raised_total",
            files_written_total: "feedback_files_written_total",
        }
    }
}

impl MetricsCollector {
    /// Record a finished analysis run
    ///
    /// `outcome` is `"complete"` or `"empty"`.
    pub fn record_analysis(&self, items: usize, duration: Duration, outcome: &'static str) {
        counter!(self.analysis_runs_total, "outcome" => outcome).increment(1);
        counter!(self.items_analyzed_total).increment(items as u64);
        histogram!(self.analysis_duration).record(duration.as_secs_f64());
        gauge!(self.batch_size).set(items as f64);
    }

    /// Record input records that were not objects and were dropped
    pub fn record_skipped(&self, count: usize) {
        if count > 0 {
            counter!(self.records_skipped_total).increment(count as u64);
        }
    }

    /// Record a sub-component that fell back to its empty result
    pub fn record_degraded(&self, component: &'static str) {
        counter!(self.degraded_components_total, "component" => component).increment(1);
    }

    /// Record raised alerts by severity
    pub fn record_alerts(&self, alerts: &[Alert]) {
        for alert in alerts {
            counter!(
                self.alerts_raised_total,
                "severity" => alert.severity.as_str(),
                "kind" => alert.kind.as_str()
            )
            .increment(1);
        }
    }

    /// Record files produced by the output writer
    pub fn record_files_written(&self, count: usize) {
        counter!(self.files_written_total).increment(count as u64);
    }
}
