//! File output for analysis runs.
//!
//! Writes the analysis, alerts and report under a fixed directory layout:
//!
//! ```text
//! <output_dir>/analysis/analysis_result.json
//! <output_dir>/alerts/alerts.json
//! <output_dir>/reports/report.json
//! <output_dir>/reports/report.txt
//! <output_dir>/data/classified_feedback.csv
//! ```

use csv::Writer;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::alerts::Alert;
use crate::config::OutputConfig;
use crate::error::Result;
use crate::models::{AnalysisResult, ClassifiedItem, TIMESTAMP_FORMAT};
use crate::report::SummaryReport;

/// Writes analysis artifacts to disk
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    write_csv: bool,
    pretty_json: bool,
}

impl OutputWriter {
    /// Writer rooted at `root`, with CSV and pretty JSON enabled
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_csv: true,
            pretty_json: true,
        }
    }

    /// Writer configured from the `output` section
    #[must_use]
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            root: PathBuf::from(&config.directory),
            write_csv: config.write_csv,
            pretty_json: config.pretty_json,
        }
    }

    /// Override the output directory
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Write every artifact of a run
    ///
    /// # Returns
    ///
    /// Paths of the created files
    pub fn write_all(
        &self,
        result: &AnalysisResult,
        alerts: &[Alert],
        report: &SummaryReport,
    ) -> Result<Vec<PathBuf>> {
        let mut written = vec![
            self.write_json("analysis", "analysis_result.json", result)?,
            self.write_json("alerts", "alerts.json", alerts)?,
            self.write_json("reports", "report.json", report)?,
            self.write_text("reports", "report.txt", &report.render_text())?,
        ];

        if self.write_csv {
            let path = self.subdir("data")?.join("classified_feedback.csv");
            write_classified_csv(&result.feedback_data, &path)?;
            written.push(path);
        }

        tracing::info!(
            directory = %self.root.display(),
            files = written.len(),
            "Wrote analysis output"
        );
        Ok(written)
    }

    fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        create_dir_all(&dir)?;
        Ok(dir)
    }

    fn write_json<T: Serialize + ?Sized>(&self, dir: &str, file_name: &str, value: &T) -> Result<PathBuf> {
        let path = self.subdir(dir)?.join(file_name);
        let mut writer = BufWriter::new(File::create(&path)?);

        if self.pretty_json {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(path)
    }

    fn write_text(&self, dir: &str, file_name: &str, text: &str) -> Result<PathBuf> {
        let path = self.subdir(dir)?.join(file_name);
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(path)
    }
}

/// Write classified items as CSV
///
/// Columns: `timestamp, platform, sentiment, category, urgency, text`.
/// Extra upstream fields are not included.
pub fn write_classified_csv(items: &[ClassifiedItem], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(BufWriter::new(file));

    writer.write_record(["timestamp", "platform", "sentiment", "category", "urgency", "text"])?;

    for item in items {
        writer.write_record([
            item.item.timestamp.format(TIMESTAMP_FORMAT).to_string().as_str(),
            item.item.platform.as_str(),
            item.sentiment.as_str(),
            item.category.as_str(),
            item.urgency.as_str(),
            item.item.text.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
