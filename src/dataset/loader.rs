//! Passenger manifest loading.
//!
//! This module fetches the manifest once (over HTTP or from disk),
//! checks the header against the expected columns and turns every row
//! into a validated `PassengerRecord`.

use crate::error::AnalysisError;
use crate::models::{PassengerRecord, REQUIRED_COLUMNS};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Public copy of the Titanic manifest.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/leontoddjohnson/datasets/main/data/titanic.csv";

/// Where the manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// HTTP(S) URL.
    Remote(String),
    /// CSV file on disk.
    Local(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{}", url),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for loading the manifest.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// HTTP request timeout.
    pub timeout_seconds: u64,
    /// Whether to show a download spinner.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            show_progress: true,
        }
    }
}

/// Load and validate the manifest from `source`.
pub async fn load_dataset(
    source: &DataSource,
    options: &LoadOptions,
) -> Result<Vec<PassengerRecord>> {
    let body = match source {
        DataSource::Remote(url) => fetch_csv(url, options).await?,
        DataSource::Local(path) => read_local(path)?,
    };

    debug!("Read {} bytes from {}", body.len(), source);

    let records = parse_csv(&body).with_context(|| format!("Invalid dataset from {}", source))?;
    info!("Loaded {} passenger records from {}", records.len(), source);

    Ok(records)
}

/// Download the CSV body.
async fn fetch_csv(url: &str, options: &LoadOptions) -> Result<String> {
    info!("Downloading dataset: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .build()
        .context("Failed to create HTTP client")?;

    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message(format!("Downloading {}", url));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            anyhow::anyhow!("Request timed out after {}s", options.timeout_seconds)
        } else if e.is_connect() {
            anyhow::anyhow!("Cannot connect to {}", url)
        } else {
            anyhow::anyhow!("Failed to download dataset: {}", e)
        }
    })?;

    if !response.status().is_success() {
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        anyhow::bail!("Dataset download failed with HTTP {}", response.status());
    }

    let body = response
        .text()
        .await
        .context("Failed to read dataset response body")?;

    if let Some(pb) = spinner {
        pb.finish_with_message("Download complete");
    }

    Ok(body)
}

fn read_local(path: &Path) -> Result<String> {
    info!("Reading dataset: {}", path.display());

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))
}

/// Parse manifest CSV text into validated records.
///
/// Every required column must be present in the header. Extra columns are
/// ignored.
pub fn parse_csv(text: &str) -> crate::error::Result<Vec<PassengerRecord>> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::schema(format!("unreadable header: {}", e)))?
        .clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::schema(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<PassengerRecord>().enumerate() {
        let row = index + 1;
        let record = result.map_err(|e| AnalysisError::schema_at(row, e.to_string()))?;
        records.push(validate_record(row, record)?);
    }

    if records.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    Ok(records)
}

/// Check value domains the type system does not cover.
fn validate_record(
    row: usize,
    mut record: PassengerRecord,
) -> crate::error::Result<PassengerRecord> {
    if record.survived > 1 {
        return Err(AnalysisError::schema_at(
            row,
            format!("Survived must be 0 or 1, got {}", record.survived),
        ));
    }

    if !record.fare.is_finite() || record.fare < 0.0 {
        return Err(AnalysisError::schema_at(
            row,
            format!("Fare must be a non-negative number, got {}", record.fare),
        ));
    }

    match record.age {
        Some(age) if !age.is_finite() => record.age = None,
        Some(age) if age < 0.0 => {
            return Err(AnalysisError::schema_at(
                row,
                format!("Age must be non-negative, got {}", age),
            ));
        }
        _ => {}
    }

    Ok(record)
}
