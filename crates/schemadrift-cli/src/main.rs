use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemadrift_catalog::{source_from_config, SchemaCapturer};
use schemadrift_core::{Config, Report, TableStatus};
use schemadrift_engine::{
    CaptureOutcome, ChangeLogger, DetectionOutcome, DriftPipeline, DuplicatePolicy, LogStatus,
};
use schemadrift_narrative::{narrator_from_config, TimeBoundNarrator};
use schemadrift_store::{FileSnapshotStore, JsonLinesChangeLog, SnapshotStore};

const DEFAULT_CONFIG: &str = "schemadrift.toml";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// SchemaDrift - Daily schema drift detection for Snowflake
#[derive(Parser)]
#[command(name = "schemadrift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemadrift.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture the warehouse schema into a dated snapshot
    Capture {
        /// Snapshot date (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// What to do if a snapshot already exists for the date (reject, skip, replace)
        #[arg(long, default_value = "reject")]
        on_duplicate: DuplicatePolicy,
    },

    /// Compare two stored snapshots
    Detect {
        /// Base snapshot date (default: the stored date before --new)
        #[arg(short, long)]
        base: Option<NaiveDate>,

        /// New snapshot date (default: the latest stored date)
        #[arg(short, long)]
        new: Option<NaiveDate>,

        /// Output file for drift report
        #[arg(short, long, default_value = "drift-report.json")]
        output: PathBuf,

        /// Skip the narrative service
        #[arg(long)]
        no_narrative: bool,
    },

    /// Capture today's snapshot and compare it with yesterday's
    Run {
        /// What to do if today's snapshot already exists (reject, skip, replace)
        #[arg(long, default_value = "reject")]
        on_duplicate: DuplicatePolicy,

        /// Output file for drift report
        #[arg(short, long, default_value = "drift-report.json")]
        output: PathBuf,

        /// Skip the narrative service
        #[arg(long)]
        no_narrative: bool,
    },

    /// List stored snapshot dates
    Snapshots,

    /// Show the change log
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Capture { date, on_duplicate } => {
            capture_command(&config, date.unwrap_or_else(today), on_duplicate).await
        }
        Commands::Detect { base, new, output, no_narrative } => {
            detect_command(&config, base, new, &output, no_narrative).await
        }
        Commands::Run { on_duplicate, output, no_narrative } => {
            run_command(&config, on_duplicate, &output, no_narrative).await
        }
        Commands::Snapshots => snapshots_command(&config).await,
        Commands::History => history_command(&config).await,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Load the config file and fill the API key from the environment
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let mut config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if config.narrative.api_key.is_none() {
        config.narrative.api_key = std::env::var(API_KEY_VAR).ok();
    }

    Ok(config)
}

/// Assemble the pipeline from config
///
/// The capturer is only attached when a `[source]` section exists, so
/// `detect` works against stored snapshots without warehouse credentials.
fn build_pipeline(config: &Config, no_narrative: bool) -> Result<DriftPipeline> {
    let narrator = if no_narrative {
        TimeBoundNarrator::disabled()
    } else {
        narrator_from_config(&config.narrative)
    };

    let pipeline = DriftPipeline::new(
        Arc::new(FileSnapshotStore::new(config.snapshot_dir())),
        narrator,
        ChangeLogger::new(Arc::new(JsonLinesChangeLog::new(config.changelog_path()))),
    );

    if config.source.is_none() {
        return Ok(pipeline);
    }

    let source = source_from_config(config)?;
    Ok(pipeline.with_capturer(SchemaCapturer::new(source, config.capture.clone())))
}

/// Capture command - snapshot the warehouse
async fn capture_command(config: &Config, date: NaiveDate, policy: DuplicatePolicy) -> Result<()> {
    let pipeline = build_pipeline(config, true)?;
    let outcome = pipeline.capture(date, policy).await?;
    print_capture_outcome(&outcome);
    Ok(())
}

/// Detect command - compare two stored snapshots
async fn detect_command(
    config: &Config,
    base: Option<NaiveDate>,
    new: Option<NaiveDate>,
    output: &Path,
    no_narrative: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config, no_narrative)?;
    let (base, new) = pipeline.resolve_dates(base, new).await?;

    let outcome = pipeline.detect(base, new).await?;
    let written = write_report(&outcome.to_report_file(), output);
    print_detection_summary(&outcome, output, &written);
    Ok(())
}

/// Run command - the daily job: capture today, compare with yesterday
async fn run_command(
    config: &Config,
    policy: DuplicatePolicy,
    output: &Path,
    no_narrative: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config, no_narrative)?;
    let outcome = pipeline.run(today(), policy).await?;

    print_capture_outcome(&outcome.capture);
    let written = write_report(&outcome.detection.to_report_file(), output);
    print_detection_summary(&outcome.detection, output, &written);
    Ok(())
}

/// Snapshots command - list stored dates
async fn snapshots_command(config: &Config) -> Result<()> {
    let store = FileSnapshotStore::new(config.snapshot_dir());
    let dates = store.dates().await?;

    if dates.is_empty() {
        println!("{} {}", "No snapshots stored in".yellow(), store.dir().display());
        return Ok(());
    }

    println!("{}", format!("Snapshots in {}:", store.dir().display()).bold());
    for date in dates {
        let snapshot = store.load(date).await?;
        println!(
            "  {}  {} columns in {} tables",
            date.to_string().cyan(),
            snapshot.len(),
            snapshot.tables().len()
        );
    }
    Ok(())
}

/// History command - print the change log
async fn history_command(config: &Config) -> Result<()> {
    let logger = ChangeLogger::new(Arc::new(JsonLinesChangeLog::new(config.changelog_path())));
    let entries = logger.history().await?;

    if entries.is_empty() {
        println!("{}", "No drift events recorded".green());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} {} -> {} (recorded {})",
            "●".bright_blue(),
            entry.base_date,
            entry.new_date,
            entry.changes_date
        );
        if entry.has_narrative() {
            for line in entry.narrative.lines() {
                println!("    {}", line);
            }
        } else {
            println!("    {}", "narrative unavailable".dimmed());
        }
    }
    Ok(())
}

/// Save the report file
///
/// Callers report a failure next to the drift rather than aborting, since
/// the snapshots and change log are already up to date by then.
fn write_report(report: &Report, output: &Path) -> Result<()> {
    report
        .save_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::debug!(path = %output.display(), "drift report saved");
    Ok(())
}

fn print_capture_outcome(outcome: &CaptureOutcome) {
    match outcome {
        CaptureOutcome::Saved(snapshot) => println!(
            "{} {} ({} columns)",
            "✓ Captured snapshot".green(),
            snapshot.date(),
            snapshot.len()
        ),
        CaptureOutcome::Replaced(snapshot) => println!(
            "{} {} ({} columns)",
            "⚠ Replaced snapshot".yellow(),
            snapshot.date(),
            snapshot.len()
        ),
        CaptureOutcome::Skipped { date, matches_stored } => {
            let note = if *matches_stored {
                "identical to stored snapshot"
            } else {
                "differs from stored snapshot"
            };
            println!("{} {} ({})", "⚠ Kept existing snapshot".yellow(), date, note);
        }
    }
}

fn print_detection_summary(outcome: &DetectionOutcome, output: &Path, written: &Result<()>) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Drift Detection Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    let (report, tables, narrative, log) = match outcome {
        DetectionOutcome::NoDrift { base_date, new_date } => {
            println!("Compared {} -> {}", base_date, new_date);
            println!();
            println!("{}", "✓ No drift detected!".green().bold());
            print_report_file_status(output, written);
            println!();
            println!("{}", "=".repeat(60).bright_blue());
            return;
        }
        DetectionOutcome::Drift { report, tables, narrative, log } => (report, tables, narrative, log),
    };

    let summary = report.summary();
    println!("Compared {} -> {}", report.base_date, report.new_date);
    println!();
    println!("{}", "Summary:".bold());
    println!("  Added:   {}", format!("{}", summary.added).green());
    println!("  Removed: {}", format!("{}", summary.removed).red().bold());
    println!("  Tables:  {}", summary.tables_affected);
    println!();

    println!("{}", "Drift Details:".bold());
    for table in tables {
        let status = match table.status {
            TableStatus::New => "NEW".green().bold(),
            TableStatus::Dropped => "DROPPED".red().bold(),
            TableStatus::Modified => "MODIFIED".yellow().bold(),
        };
        println!("  [{}] {}.{}", status, table.schema, table.table);
        for column in &table.added {
            println!("    {} {}", "+".green(), column);
        }
        for column in &table.removed {
            println!("    {} {}", "-".red(), column);
        }
    }
    println!();

    match narrative.text() {
        Some(text) => {
            println!("{}", "Narrative:".bold());
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        None => println!("{} {}", "⚠".yellow(), narrative),
    }
    println!();

    match log {
        LogStatus::Recorded(_) => println!("{}", "✓ Recorded in change log".green()),
        LogStatus::Failed(reason) => {
            println!("{} {}", "✗ Change log write failed:".red().bold(), reason)
        }
    }
    print_report_file_status(output, written);

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_report_file_status(output: &Path, written: &Result<()>) {
    match written {
        Ok(()) => println!("{} {}", "✓ Report written to".green(), output.display()),
        Err(e) => println!("{} {:#}", "✗ Report write failed:".red().bold(), e),
    }
}
