use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use feedback_insights::alerts::AlertEngine;
use feedback_insights::analyzer::Analyzer;
use feedback_insights::clock::FixedClock;
use feedback_insights::config::AppConfig;
use feedback_insights::ingest::FeedbackLoader;
use feedback_insights::logging::{init_logging, OperationTimer};
use feedback_insights::metrics::MetricsCollector;
use feedback_insights::output::OutputWriter;
use feedback_insights::report::SummaryReport;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (overrides config/default and config/local)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze collected feedback files and write results
    Analyze {
        /// JSON or CSV files, or directories containing them
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Time used for items without a timestamp (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Number of keywords to extract
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Label a single piece of text
    Classify {
        /// Feedback text
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref())?;

    // Initialize logging
    let _guard = init_logging(
        Some(&config.get_log_level()),
        &config.logging.format,
        config.logging.file_path.as_deref().map(Path::new),
    )?;

    info!("Starting feedback-insights");

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            now,
            top_n,
        } => {
            if let Some(top_n) = top_n {
                config.analysis.keyword_top_n = top_n;
                config.validate()?;
            }
            analyze_files(&config, &input, output_dir, now.as_deref())?;
        }
        Commands::Classify { text } => classify_text(&config, &text)?,
    }

    Ok(())
}

/// Load, analyze, alert, report and write one batch
fn analyze_files(
    config: &AppConfig,
    inputs: &[PathBuf],
    output_dir: Option<PathBuf>,
    now: Option<&str>,
) -> Result<()> {
    let timer = OperationTimer::new("analyze_files");
    let metrics = MetricsCollector::default();

    let loader = FeedbackLoader::new(config.processing.clone());
    let records = loader
        .load_paths(inputs)
        .context("Failed to load feedback input")?;
    info!("Loaded {} feedback records", records.len());
    if records.is_empty() {
        warn!("No feedback records found in input");
    }

    let mut analyzer = Analyzer::new(&config.analysis)?;
    if let Some(now) = now {
        analyzer = analyzer.with_clock(FixedClock(parse_now(now)?));
    }

    let result = analyzer.analyze(&records);
    let alerts = AlertEngine::new(config.alerts.clone()).evaluate(&result);
    metrics.record_alerts(&alerts);
    let report = SummaryReport::build(&result, &alerts);

    let mut writer = OutputWriter::from_config(&config.output);
    if let Some(dir) = output_dir {
        writer = writer.with_root(dir);
    }
    let files = writer
        .write_all(&result, &alerts, &report)
        .context("Failed to write analysis output")?;
    metrics.record_files_written(files.len());

    for file in &files {
        info!("Wrote {}", file.display());
    }
    info!(
        items = result.total(),
        alerts = alerts.len(),
        "Analysis finished"
    );
    timer.finish();

    Ok(())
}

/// Print the labels for `text` as JSON
#[allow(clippy::print_stdout)]
fn classify_text(config: &AppConfig, text: &str) -> Result<()> {
    let classified = Analyzer::new(&config.analysis)?.classify_one(text);

    let labels = serde_json::json!({
        "text": classified.item.text,
        "sentiment": classified.sentiment,
        "category": classified.category,
        "urgency": classified.urgency,
    });
    println!("{}", serde_json::to_string_pretty(&labels)?);
    Ok(())
}

/// Parse the `--now` override
fn parse_now(raw: &str) -> Result<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .with_context(|| format!("Invalid --now value '{raw}', expected RFC 3339"))
}
