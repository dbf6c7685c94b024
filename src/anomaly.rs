//! Statistical anomaly detection over daily feedback volume.
//!
//! A day is anomalous when its count exceeds `mean + sigma * std` of all
//! observed daily counts, using the sample standard deviation.

use std::collections::BTreeMap;

use crate::error::{FeedbackError, Result};
use crate::models::{Anomalies, ClassifiedItem, Sentiment};
use crate::trends::daily_counts;

/// Mean and sample standard deviation of a series of counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0.0 for a single value
    pub std_dev: f64,
}

impl DailyStats {
    /// Statistics for `counts`, or `None` when empty
    #[must_use]
    pub fn from_counts<'a, I>(counts: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        let values: Vec<f64> = counts.into_iter().map(|&c| c as f64).collect();
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self { mean, std_dev })
    }

    /// Count above which a day is anomalous
    #[must_use]
    pub fn threshold(&self, sigma: f64) -> f64 {
        sigma.mul_add(self.std_dev, self.mean)
    }
}

/// Flags days whose volume deviates from the batch's own history
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    sigma: f64,
    min_days: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(2.0, 3)
    }
}

impl AnomalyDetector {
    /// Detector flagging counts above `mean + sigma * std`, active once at
    /// least `min_days` distinct days are present
    #[must_use]
    pub const fn new(sigma: f64, min_days: usize) -> Self {
        Self { sigma, min_days }
    }

    /// Overall and negative-sentiment anomalies for `items`
    ///
    /// Returns empty maps when fewer than `min_days` days are observed.
    pub fn detect(&self, items: &[ClassifiedItem]) -> Result<Anomalies> {
        let all_days = daily_counts(items, |_| true)?;
        if all_days.len() < self.min_days {
            tracing::debug!(
                days = all_days.len(),
                required = self.min_days,
                "Not enough history for anomaly detection"
            );
            return Ok(Anomalies::default());
        }

        let negative_days = daily_counts(items, |i| i.sentiment == Sentiment::Negative)?;

        Ok(Anomalies {
            volume_anomalies: self.flag(&all_days)?,
            negative_sentiment_anomalies: self.flag(&negative_days)?,
        })
    }

    /// Days in `counts` above the threshold computed from `counts` itself
    pub fn flag(&self, counts: &BTreeMap<String, usize>) -> Result<BTreeMap<String, usize>> {
        let Some(stats) = DailyStats::from_counts(counts.values()) else {
            return Ok(BTreeMap::new());
        };

        let threshold = stats.threshold(self.sigma);
        if !threshold.is_finite() {
            return Err(FeedbackError::Numerical(format!(
                "anomaly threshold is not finite (mean {}, std {})",
                stats.mean, stats.std_dev
            )));
        }

        Ok(counts
            .iter()
            .filter(|(_, &count)| count as f64 > threshold)
            .map(|(day, &count)| (day.clone(), count))
            .collect())
    }
}
