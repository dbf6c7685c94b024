//! Day-bucketed trend aggregation.

use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;

use crate::error::{FeedbackError, Result};
use crate::models::{
    Category, CategoryTrendRow, ClassifiedItem, DailyCount, Sentiment, SentimentTrendRow,
    TimeTrends,
};
use crate::validation::InputValidator;

/// Calendar-day key (`YYYY-MM-DD`) for a timestamp
///
/// Keys must sort chronologically as strings, so years outside 1..=9999
/// are rejected.
pub fn day_key(timestamp: &NaiveDateTime) -> Result<String> {
    if !InputValidator::in_supported_range(timestamp) {
        return Err(FeedbackError::InvalidTimestamp(format!(
            "year {} cannot be bucketed by day",
            timestamp.year()
        )));
    }
    Ok(timestamp.format("%Y-%m-%d").to_string())
}

/// Item count per day key for the items accepted by `filter`
pub fn daily_counts<F>(items: &[ClassifiedItem], filter: F) -> Result<BTreeMap<String, usize>>
where
    F: Fn(&ClassifiedItem) -> bool,
{
    let mut counts = BTreeMap::new();
    for item in items.iter().filter(|item| filter(item)) {
        *counts.entry(day_key(&item.item.timestamp)?).or_insert(0) += 1;
    }
    Ok(counts)
}

#[derive(Debug, Default)]
struct DayAccumulator {
    total: usize,
    sentiments: BTreeMap<Sentiment, usize>,
    categories: BTreeMap<Category, usize>,
}

impl DayAccumulator {
    fn add(&mut self, item: &ClassifiedItem) {
        self.total += 1;
        *self.sentiments.entry(item.sentiment).or_insert(0) += 1;
        *self.categories.entry(item.category).or_insert(0) += 1;
    }

    fn sentiment(&self, sentiment: Sentiment) -> usize {
        self.sentiments.get(&sentiment).copied().unwrap_or(0)
    }

    fn category(&self, category: Category) -> usize {
        self.categories.get(&category).copied().unwrap_or(0)
    }
}

/// Groups classified items by calendar day
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendAggregator;

impl TrendAggregator {
    /// Daily volume, sentiment and category trends for `items`
    ///
    /// Rows are ascending by day; every label column is present on every
    /// row, with zero for labels not seen that day.
    pub fn aggregate(&self, items: &[ClassifiedItem]) -> Result<TimeTrends> {
        let mut days: BTreeMap<String, DayAccumulator> = BTreeMap::new();
        for item in items {
            days.entry(day_key(&item.item.timestamp)?)
                .or_default()
                .add(item);
        }

        let mut trends = TimeTrends::default();
        for (day, acc) in days {
            trends.daily_count.push(DailyCount {
                day: day.clone(),
                count: acc.total,
            });
            trends.sentiment_trend.push(SentimentTrendRow {
                day: day.clone(),
                positive: acc.sentiment(Sentiment::Positive),
                negative: acc.sentiment(Sentiment::Negative),
                neutral: acc.sentiment(Sentiment::Neutral),
            });
            trends.category_trend.push(CategoryTrendRow {
                day,
                bug: acc.category(Category::Bug),
                feature_request: acc.category(Category::FeatureRequest),
                ux_issue: acc.category(Category::UxIssue),
                positive_feedback: acc.category(Category::PositiveFeedback),
                other: acc.category(Category::Other),
            });
        }

        Ok(trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedbackItem, Urgency};
    use chrono::NaiveDate;

    fn item(day: u32, hour: u32, sentiment: Sentiment, category: Category) -> ClassifiedItem {
        let timestamp = NaiveDate::from_ymd_opt(2023, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid date");
        ClassifiedItem {
            item: FeedbackItem::new("text", timestamp, "Twitter"),
            sentiment,
            category,
            urgency: Urgency::Low,
        }
    }

    #[test]
    fn test_day_key_format() {
        let ts = NaiveDate::from_ymd_opt(2023, 3, 7)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .expect("valid date");
        assert_eq!(day_key(&ts).expect("key"), "2023-03-07");
    }

    #[test]
    fn test_day_key_rejects_out_of_range_years() {
        let ts = NaiveDate::from_ymd_opt(10_000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        assert!(day_key(&ts).is_err());
    }

    #[test]
    fn test_aggregate_pivots_with_zero_fill() {
        let items = vec![
            item(16, 9, Sentiment::Negative, Category::Bug),
            item(15, 10, Sentiment::Positive, Category::PositiveFeedback),
            item(15, 18, Sentiment::Positive, Category::FeatureRequest),
        ];

        let trends = TrendAggregator.aggregate(&items).expect("aggregate");

        assert_eq!(
            trends.daily_count,
            vec![
                DailyCount { day: "2023-01-15".into(), count: 2 },
                DailyCount { day: "2023-01-16".into(), count: 1 },
            ]
        );
        assert_eq!(
            trends.sentiment_trend[0],
            SentimentTrendRow {
                day: "2023-01-15".into(),
                positive: 2,
                negative: 0,
                neutral: 0,
            }
        );
        assert_eq!(trends.category_trend[1].bug, 1);
        assert_eq!(trends.category_trend[1].feature_request, 0);
        assert_eq!(trends.category_trend[0].feature_request, 1);
    }

    #[test]
    fn test_daily_count_sums_to_batch_size() {
        let items: Vec<_> = (1..=20)
            .map(|i| item(1 + i % 4, i % 24, Sentiment::Neutral, Category::Other))
            .collect();
        let trends = TrendAggregator.aggregate(&items).expect("aggregate");
        let total: usize = trends.daily_count.iter().map(|d| d.count).sum();
        assert_eq!(total, items.len());
    }

    #[test]
    fn test_empty_batch_has_empty_trends() {
        let trends = TrendAggregator.aggregate(&[]).expect("aggregate");
        assert!(trends.is_empty());
        assert!(trends.sentiment_trend.is_empty());
        assert!(trends.category_trend.is_empty());
    }

    #[test]
    fn test_daily_counts_with_filter() {
        let items = vec![
            item(1, 1, Sentiment::Negative, Category::Bug),
            item(1, 2, Sentiment::Positive, Category::Other),
            item(2, 1, Sentiment::Negative, Category::UxIssue),
        ];
        let negative =
            daily_counts(&items, |i| i.sentiment == Sentiment::Negative).expect("counts");
        assert_eq!(negative.get("2023-01-01"), Some(&1));
        assert_eq!(negative.get("2023-01-02"), Some(&1));
    }
}
