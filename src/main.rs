//! ReportCards - per-student report cards from a score workbook
//!
//! A CLI tool that reads one score per row from an Excel workbook,
//! groups the rows by student, and writes one report card per student
//! with the total, the average and a table of the individual scores.
//!
//! Exit codes:
//!   0 - Batch completed (some students may have been skipped)
//!   1 - Fatal error (missing source, invalid columns, bad config, etc.)

mod analysis;
mod batch;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use batch::{BarProgress, ProgressReporter, SilentProgress};
use cli::Args;
use config::{Config, CONFIG_FILE};
use models::BatchReport;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can enable verbose mode
    let (mut config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(log_level(&args, &config));

    info!("ReportCards v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    // Run the batch
    match run(&args, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Batch aborted: {:#}", e);
            eprintln!("\n❌ Batch aborted: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .reportcards.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the source columns, output format, and more.");
    Ok(())
}

/// Effective log level: --quiet wins, then --verbose or the config flag.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Load configuration from file or use defaults.
///
/// Returns the configuration and the file it came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}

/// Run the batch (or the dry run) described by the merged configuration.
async fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let batch_config = config.batch_config();

    println!("📥 Reading scores: {}", batch_config.source_path.display());

    if args.dry_run {
        return handle_dry_run(&batch_config);
    }

    let progress: Box<dyn ProgressReporter> = if args.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let report = batch::run_batch(&batch_config, progress.as_ref()).await?;

    if let Some(ref summary_path) = args.summary {
        match write_summary(&report, summary_path) {
            Ok(()) => info!("Batch summary written to {}", summary_path.display()),
            Err(e) => error!("{:#}", e),
        }
    }

    print_summary(&report, start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Handle --dry-run: load, validate and group, print the plan, exit.
fn handle_dry_run(batch_config: &batch::BatchConfig) -> Result<()> {
    println!("\n🔍 Dry run: validating and grouping (nothing is written)...\n");

    let planned = batch::plan_batch(batch_config)?;

    if planned.is_empty() {
        println!("   No students found.");
    } else {
        println!("   {} report cards would be written:\n", planned.len());
        for artifact in &planned {
            println!(
                "     📄 {} (ID: {}, {} rows) -> {}",
                artifact.entity_name,
                artifact.entity_id,
                artifact.rows,
                artifact.path.display()
            );
        }
    }

    println!("\n✅ Dry run complete. No files were written.");
    Ok(())
}

/// Write the batch report as JSON.
fn write_summary(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize batch summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write batch summary to {}", path.display()))
}

/// Print the end-of-batch summary.
fn print_summary(report: &BatchReport, duration: f64) {
    println!("\n📊 Batch Summary:");
    println!("   Students: {}", report.entities.len());
    println!(
        "   - ✅ Written: {} | ⏭️  Skipped: {} | ❌ Failed: {}",
        report.rendered(),
        report.skipped(),
        report.failed()
    );
    if report.dropped_rows > 0 {
        println!("   Rows without a student ID: {}", report.dropped_rows);
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Batch completed: {} processed, {} skipped.",
        report.rendered(),
        report.skipped() + report.failed()
    );
}
