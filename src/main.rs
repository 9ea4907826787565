//! titanic-eda - Titanic passenger manifest dashboard
//!
//! A CLI tool that loads the Titanic manifest once, computes grouped
//! survival and fare statistics, and writes a dashboard with two bar
//! charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (download, schema, empty dataset, I/O)

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{PassengerRecord, Report, ReportMetadata};
use report::{ChartStyle, RenderOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Log level comes from the merged config
    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(config.log_level(args.quiet));

    info!("titanic-eda v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(args, config).await {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .titanic-eda.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the data source, report and chart colors.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete load → aggregate → render workflow.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load the manifest exactly once
    let source = config.data_source();
    println!("📥 Loading dataset: {}", source);
    let records = dataset::load_dataset(&source, &config.load_options(!args.quiet)).await?;

    if args.dry_run {
        return handle_dry_run(&records);
    }

    // Step 2: Aggregate
    println!("🔬 Aggregating {} passenger records...", records.len());
    let report = build_report(&records, &config, &source.to_string(), start_time)?;

    // Step 3: Render and save
    println!("📝 Generating dashboard...");
    let render_options = RenderOptions::from(&config.report);
    let output = match config.general.format {
        OutputFormat::Html => report::generate_html_dashboard(&report, &render_options)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &render_options),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    let output_path = Path::new(&config.general.output);
    report::write_report(&output, output_path)?;

    print_summary(&report);
    println!("\n✅ Dashboard saved to: {}", output_path.display());

    Ok(())
}

/// Run every aggregation over the loaded records and assemble the report.
fn build_report(
    records: &[PassengerRecord],
    config: &Config,
    source: &str,
    start_time: Instant,
) -> Result<Report> {
    let survival = analysis::survival_demographics(records)
        .context("Survival demographics failed")?;
    let gender = analysis::gender_survival(&survival).context("Gender rollup failed")?;
    let family_groups =
        analysis::family_groups(records).context("Family fare grouping failed")?;
    let last_names = analysis::last_names(records).context("Last name counting failed")?;
    let top_families = analysis::top_families_by_fare(records, config.report.top_families)
        .context("Family fare ranking failed")?;

    info!(
        "Computed {} survival groups, {} fare groups, {} last names, {} ranked families",
        survival.len(),
        family_groups.len(),
        last_names.len(),
        top_families.len()
    );

    if top_families.is_empty() {
        warn!("No last name appears more than once; the family chart will be empty");
    }

    let style = ChartStyle::from(&config.charts);
    let charts = vec![
        report::survival_by_gender_chart(&gender, &style),
        report::top_families_chart(&top_families, config.report.top_families, &style),
    ];

    Ok(Report {
        metadata: ReportMetadata {
            source: source.to_string(),
            analysis_date: Utc::now(),
            records: records.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        survival,
        gender,
        family_groups,
        last_names,
        top_families,
        charts,
    })
}

/// Handle --dry-run: report what was loaded and exit.
fn handle_dry_run(records: &[PassengerRecord]) -> Result<()> {
    println!("\n🔍 Dry run: dataset is valid ({} records)\n", records.len());

    for (pclass, count) in analysis::class_distribution(records) {
        println!("     Class {}: {} passengers", pclass, count);
    }

    let missing_ages = records.iter().filter(|r| r.age.is_none()).count();
    println!("     Missing ages: {}", missing_ages);

    println!("\n✅ Dry run complete. No report was written.");
    Ok(())
}

fn print_summary(report: &Report) {
    println!("\n📊 Analysis Summary:");
    println!("   Passengers: {}", report.metadata.records);
    for row in &report.gender {
        println!(
            "   - {}: {}/{} survived ({:.1}%)",
            row.sex,
            row.survivors,
            row.total_passengers,
            row.survival_rate * 100.0
        );
    }
    if let Some(top) = report.top_families.first() {
        println!(
            "   Highest average fare: {} (class {}, {:.2})",
            top.last_name, top.pclass, top.average_fare
        );
    }
    println!("   Duration: {:.2}s", report.metadata.duration_seconds);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
