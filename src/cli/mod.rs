//! CLI commands implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::repository::{AsyncSqlitePool, JobRepository};
use crate::scrapers::TierPolicy;
use crate::services::ScrapePipeline;

#[derive(Parser)]
#[command(name = "jobq")]
#[command(about = "Job listing acquisition and catalog system")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and catalog database
    Init,

    /// Acquire listings from the configured source
    Scrape {
        /// Limit number of listings to capture (defaults to the configured cap)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Skip the rendering engine and go straight to the static fetch
        #[arg(long)]
        no_browser: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cataloged jobs, newest first
    Jobs {
        /// Maximum rows to list
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show catalog status
    Status,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.data_dir.clone());

    match cli.command {
        Commands::Init => cmd_init(&settings).await,
        Commands::Scrape {
            limit,
            no_browser,
            json,
        } => cmd_scrape(&settings, limit, no_browser, json).await,
        Commands::Jobs { limit } => cmd_jobs(&settings, limit).await,
        Commands::Status => cmd_status(&settings).await,
    }
}

fn open_repository(settings: &Settings) -> JobRepository {
    JobRepository::new(AsyncSqlitePool::new(&settings.database_url()))
}

async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "could not create data directory {}",
            settings.data_dir.display()
        )
    })?;

    let repo = open_repository(settings);
    repo.ensure_schema().await.context("schema bootstrap failed")?;

    println!(
        "{} Initialized catalog at {}",
        style("✓").green(),
        settings.database_path().display()
    );
    Ok(())
}

async fn cmd_scrape(
    settings: &Settings,
    limit: Option<usize>,
    no_browser: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !settings.database_exists() {
        println!(
            "{} Catalog not initialized. Run: jobq init",
            style("✗").red()
        );
        return Ok(());
    }

    let repo = open_repository(settings);
    repo.ensure_schema().await?;

    let policy = if no_browser {
        TierPolicy::without_browser()
    } else {
        TierPolicy::default()
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("Acquiring listings from {}", settings.jobs_url()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let pipeline = ScrapePipeline::new(settings.clone(), repo);
    let result = pipeline.run(&policy, limit).await;

    spinner.finish_and_clear();
    let summary = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} Found {} listings from {}",
        style("✓").green(),
        summary.jobs_found,
        summary.source
    );
    println!("  {} saved, {} skipped as duplicates", summary.jobs_saved, summary.jobs_skipped);
    Ok(())
}

async fn cmd_jobs(settings: &Settings, limit: i64) -> anyhow::Result<()> {
    let repo = open_repository(settings);
    repo.ensure_schema().await?;

    let jobs = repo.list_recent(limit).await?;
    if jobs.is_empty() {
        println!("Catalog is empty. Run: jobq scrape");
        return Ok(());
    }

    for job in jobs {
        let mut line = format!(
            "{}  {} at {} ({})",
            style(job.posting_date.format("%Y-%m-%d")).dim(),
            style(&job.title).bold(),
            job.company,
            job.location
        );
        if !job.tags.is_empty() {
            line.push_str(&format!("  [{}]", job.tags.join(", ")));
        }
        println!("{}", line);
    }
    Ok(())
}

async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    if !settings.database_exists() {
        println!(
            "{} Catalog not initialized. Run: jobq init",
            style("✗").red()
        );
        return Ok(());
    }

    let repo = open_repository(settings);
    repo.ensure_schema().await?;
    let stats = repo.stats().await?;

    println!("Catalog: {}", settings.database_path().display());
    println!("  {} jobs total", stats.total);
    println!("  {} posted today", stats.posted_today);
    println!("  {} distinct companies", stats.companies);
    Ok(())
}
