//! Layered application configuration.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log level, format and optional file
    pub logging: LoggingConfig,
    /// Classifier, keyword and anomaly settings
    pub analysis: AnalysisConfig,
    /// Input preprocessing
    pub processing: ProcessingConfig,
    /// Alert thresholds
    pub alerts: AlertConfig,
    /// Output files
    pub output: OutputConfig,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
    /// Daily-rolling JSON log file
    pub file_path: Option<String>,
    /// Console format, "json" or "text"
    pub format: String,
}

/// Analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// "lexicon" or "wordlist"
    pub sentiment_scorer: String,
    /// Scores above this are positive
    pub positive_threshold: f32,
    /// Scores below this are negative
    pub negative_threshold: f32,
    /// Maximum number of keywords
    pub keyword_top_n: usize,
    /// Batches smaller than this use plain word frequency instead of TF-IDF
    pub keyword_min_batch: usize,
    /// Standard deviations above the mean before a day is flagged
    pub anomaly_sigma: f64,
    /// Days of history needed before anything is flagged
    pub anomaly_min_days: usize,
}

/// Preprocessing applied while loading input files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Drop names, emails and other personal fields
    pub strip_personal_fields: bool,
    /// Lowercase item text
    pub lowercase_text: bool,
    /// Trim and lowercase platform names
    pub normalize_platform: bool,
}

/// Alert thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Urgent negative items needed for an alert
    pub urgent_negative_threshold: usize,
    /// Negative share (0 to 1) that raises an alert
    pub negative_share_threshold: f64,
    /// Batch size below which the share rule is skipped
    pub min_items: usize,
}

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for all written files
    pub directory: String,
    /// Also write the classified items as CSV
    pub write_csv: bool,
    /// Indent JSON output
    pub pretty_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sentiment_scorer: "lexicon".to_string(),
            positive_threshold: 0.1,
            negative_threshold: -0.1,
            keyword_top_n: 10,
            keyword_min_batch: 3,
            anomaly_sigma: 2.0,
            anomaly_min_days: 3,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            strip_personal_fields: true,
            lowercase_text: false,
            normalize_platform: false,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            urgent_negative_threshold: 3,
            negative_share_threshold: 0.5,
            min_items: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./output".to_string(),
            write_csv: true,
            pretty_json: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    ///
    /// Defaults, then `config/default` and `config/local`, then `explicit`
    /// (which must exist when given), then `FEEDBACK__SECTION__KEY`
    /// environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("FEEDBACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let app_config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        let valid_scorers = ["lexicon", "wordlist"];
        if !valid_scorers.contains(&self.analysis.sentiment_scorer.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid sentiment scorer: {}. Must be one of: {:?}",
                self.analysis.sentiment_scorer,
                valid_scorers
            ));
        }

        if !(self.analysis.positive_threshold.is_finite()
            && self.analysis.negative_threshold.is_finite())
        {
            return Err(anyhow::anyhow!("sentiment thresholds must be finite numbers"));
        }
        if self.analysis.negative_threshold > self.analysis.positive_threshold {
            return Err(anyhow::anyhow!(
                "negative_threshold must not exceed positive_threshold"
            ));
        }
        if self.analysis.keyword_top_n == 0 {
            return Err(anyhow::anyhow!("keyword_top_n must be greater than 0"));
        }
        if !(self.analysis.anomaly_sigma.is_finite() && self.analysis.anomaly_sigma >= 0.0) {
            return Err(anyhow::anyhow!("anomaly_sigma must be a non-negative number"));
        }
        if self.analysis.anomaly_min_days == 0 {
            return Err(anyhow::anyhow!("anomaly_min_days must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.alerts.negative_share_threshold) {
            return Err(anyhow::anyhow!(
                "negative_share_threshold must be between 0 and 1"
            ));
        }
        if self.alerts.urgent_negative_threshold == 0 {
            return Err(anyhow::anyhow!(
                "urgent_negative_threshold must be greater than 0"
            ));
        }

        if self.output.directory.trim().is_empty() {
            return Err(anyhow::anyhow!("output directory cannot be empty"));
        }

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
