//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::dataset::DEFAULT_DATASET_URL;

/// titanic-eda - exploratory analysis of the Titanic passenger manifest
///
/// Loads the manifest once, computes survival and fare aggregations and
/// writes a dashboard with two bar charts.
///
/// Examples:
///   titanic-eda
///   titanic-eda --local ./titanic.csv --format markdown --output report.md
///   titanic-eda --top 5 --format json
///   titanic-eda --dry-run
///   titanic-eda --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// URL of the manifest CSV
    #[arg(
        short,
        long,
        value_name = "URL",
        default_value = DEFAULT_DATASET_URL,
        env = "TITANIC_DATA_URL"
    )]
    pub source: String,

    /// Local CSV file to analyze instead of downloading
    #[arg(short, long, value_name = "FILE")]
    pub local: Option<PathBuf>,

    /// Output file path for the dashboard
    ///
    /// Defaults to the config file value (titanic_dashboard.html).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .titanic-eda.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of families in the fare ranking
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and validate the manifest without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .titanic-eda.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML page with interactive charts (default)
    #[default]
    Html,
    /// Markdown tables
    Markdown,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.local.is_none()
            && !self.source.starts_with("http://")
            && !self.source.starts_with("https://")
        {
            return Err("Source URL must start with 'http://' or 'https://'".to_string());
        }

        if let Some(ref local_path) = self.local {
            if !local_path.is_file() {
                return Err(format!(
                    "Local dataset does not exist or is not a file: {}",
                    local_path.display()
                ));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("Top family count must be at least 1".to_string());
        }

        Ok(())
    }
}
