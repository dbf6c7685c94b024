//! Feedback Insights - Customer Feedback Analysis
//!
//! A Rust library for labelling and summarizing batches of customer
//! feedback collected from social media, review sites and surveys.
//!
//! # Features
//!
//! - Sentiment, category and urgency labels per item
//! - Batch keywords (word frequency or TF-IDF)
//! - Daily volume, sentiment and category trends
//! - Statistical anomaly detection over daily volume
//! - Alerts, summary reports and file export

/// Alert rules over analysis results
pub mod alerts;
/// Batch analysis orchestration
pub mod analyzer;
/// Daily volume anomaly detection
pub mod anomaly;
/// Per-item sentiment, category and urgency labelling
pub mod classifier;
/// Injectable time source
pub mod clock;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Loading feedback from JSON and CSV files
pub mod ingest;
/// Keyword extraction
pub mod keywords;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Writing analysis artifacts to disk
pub mod output;
/// Summary reports
pub mod report;
/// Day-bucketed trend aggregation
pub mod trends;
/// Input validation and normalization
pub mod validation;

// Re-export key components for easier access
pub use alerts::{Alert, AlertEngine};
pub use analyzer::Analyzer;
pub use error::{FeedbackError, Result};
pub use models::{AnalysisResult, Category, ClassifiedItem, FeedbackItem, Sentiment, Urgency};
pub use report::SummaryReport;
