//! Error types for the feedback-insights library.
//!
//! This module provides custom error types using `thiserror` so that every
//! analysis sub-component can report what went wrong without panicking.

use thiserror::Error;

/// Errors that can occur while loading, analysing or exporting feedback.
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A pattern failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// The input batch or one of its items could not be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A timestamp cannot be turned into a calendar-day key
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Every token in the corpus was removed during keyword extraction
    #[error("Empty vocabulary; the documents may only contain stop words")]
    EmptyVocabulary,

    /// Statistics produced a non-finite value
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Unsupported input file
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience type alias for Result with `FeedbackError`
pub type Result<T> = std::result::Result<T, FeedbackError>;
