//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.titanic-eda.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::DEFAULT_TOP_FAMILIES;
use crate::cli::OutputFormat;
use crate::dataset::{DataSource, LoadOptions, DEFAULT_DATASET_URL};
use crate::report::{ChartStyle, RenderOptions};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".titanic-eda.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "titanic_dashboard.html".to_string()
}

/// Where the manifest is loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Manifest URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Local CSV path; takes precedence over `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            local: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_DATASET_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Report content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Families shown in the fare ranking.
    #[serde(default = "default_top_families")]
    pub top_families: usize,

    /// Rows of the last-name table to show.
    #[serde(default = "default_last_name_rows")]
    pub last_name_rows: usize,

    /// Include the full data tables.
    #[serde(default = "default_true")]
    pub include_tables: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_families: default_top_families(),
            last_name_rows: default_last_name_rows(),
            include_tables: true,
        }
    }
}

fn default_top_families() -> usize {
    DEFAULT_TOP_FAMILIES
}

fn default_last_name_rows() -> usize {
    20
}

fn default_true() -> bool {
    true
}

/// Chart color settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_male_color")]
    pub male_color: String,

    #[serde(default = "default_female_color")]
    pub female_color: String,

    /// Paper and plot background color.
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            male_color: default_male_color(),
            female_color: default_female_color(),
            background: default_background(),
        }
    }
}

fn default_male_color() -> String {
    "blue".to_string()
}

fn default_female_color() -> String {
    "pink".to_string()
}

fn default_background() -> String {
    "white".to_string()
}

impl From<&ChartsConfig> for ChartStyle {
    fn from(config: &ChartsConfig) -> Self {
        Self {
            male_color: config.male_color.clone(),
            female_color: config.female_color.clone(),
            background: config.background.clone(),
        }
    }
}

impl From<&ReportConfig> for RenderOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            last_name_rows: config.last_name_rows,
            include_tables: config.include_tables,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.source != DEFAULT_DATASET_URL {
            self.source.url = args.source.clone();
        }
        if let Some(ref local) = args.local {
            self.source.local = Some(local.display().to_string());
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(top) = args.top {
            self.report.top_families = top;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check merged values the CLI validation cannot see.
    pub fn validate(&self) -> Result<(), String> {
        if self.report.top_families == 0 {
            return Err("report.top_families must be at least 1".to_string());
        }

        if self.source.timeout_seconds == 0 {
            return Err("source.timeout_seconds must be at least 1".to_string());
        }

        Ok(())
    }

    /// Log level after merging; `quiet` wins over `general.verbose`.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The manifest source after merging.
    pub fn data_source(&self) -> DataSource {
        match self.source.local {
            Some(ref path) => DataSource::Local(path.into()),
            None => DataSource::Remote(self.source.url.clone()),
        }
    }

    /// Loader options after merging.
    pub fn load_options(&self, show_progress: bool) -> LoadOptions {
        LoadOptions {
            timeout_seconds: self.source.timeout_seconds,
            show_progress,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
