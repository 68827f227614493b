//! # Absurdity Index
//!
//! Collects public posts, videos, reviews and complaints about everyday
//! crises, labels each item by severity, and blends the engagement-weighted
//! result with official statistics into one 0-100 score per topic.
//!
//! ## Usage
//!
//! ```sh
//! absurdity_index collect all
//! absurdity_index official
//! absurdity_index dedupe
//! absurdity_index publish --ts-file lib/metricDetailData.ts
//! ```
//!
//! ## Architecture
//!
//! The weekly `update` runs the stages in order:
//! 1. **Collect**: one timestamped CSV per topic and source
//! 2. **Official**: FRED series normalized into `official_scores.json`
//! 3. **Dedupe**: a Reddit post stays in its single best-matching topic
//! 4. **Score**: latest snapshot per source, weighted and blended
//! 5. **Publish**: regex rewrite of the dashboard's TypeScript data file

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod categorize;
mod cli;
mod collectors;
mod config;
mod dedupe;
mod discovery;
mod error;
mod models;
mod official;
mod outputs;
mod publish;
mod scoring;
mod utils;

use cli::{Cli, Command, ScoreArgs};
use collectors::http::default_fetcher;
use collectors::{Collector, CollectorKind, TopicSelection};
use config::Config;
use models::MetricScore;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("absurdity_index starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(data_dir = %args.data_dir.display(), config = ?args.config, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref())?;

    // Early check: every command reads or writes the data dir
    if let Err(e) = ensure_writable_dir(&args.data_dir).await {
        error!(
            path = %args.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    match &args.command {
        Command::Collect { source, topic } => {
            let topics = topic_selection(&config, topic.as_deref())?;
            collect(&args, *source, &topics).await?;
        }
        Command::Official => {
            official(&args, &config).await?;
        }
        Command::Dedupe { dry_run, min_rows } => {
            dedupe(&args.data_dir, &config, *min_rows, *dry_run).await?;
        }
        Command::Score(score_args) => {
            score(&args.data_dir, &config, score_args).await?;
        }
        Command::Publish { score: score_args, ts_file } => {
            let scores = score(&args.data_dir, &config, score_args).await?;
            publish(ts_file, &scores).await?;
        }
        Command::Update {
            skip_collect,
            no_publish,
            score: score_args,
            ts_file,
        } => {
            update(&args, &config, *skip_collect, *no_publish, score_args, ts_file).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Every configured topic, narrowed to `topic` when it is configured.
fn topic_selection(config: &Config, topic: Option<&str>) -> error::Result<TopicSelection> {
    if let Some(slug) = topic.filter(|slug| config.metric(slug).is_none()) {
        return Err(error::Error::Config(format!("unknown topic: {slug}")));
    }
    Ok(TopicSelection {
        configured: config.metrics.iter().map(|m| m.slug.clone()).collect(),
        only: topic.map(str::to_string),
    })
}

async fn collect(args: &Cli, kind: CollectorKind, topics: &TopicSelection) -> error::Result<()> {
    let collector = Collector::new(default_fetcher()?, &args.data_dir);
    let report = collectors::run(kind, &collector, topics, args.youtube_api_key.as_deref()).await?;
    info!(collector = ?kind, files = report.files.len(), rows = report.rows, "Collection complete");
    for file in &report.files {
        debug!(path = %file.display(), "Wrote snapshot");
    }
    Ok(())
}

async fn official(args: &Cli, config: &Config) -> error::Result<()> {
    let api_key = args
        .fred_api_key
        .as_deref()
        .ok_or(error::Error::MissingApiKey("FRED_API_KEY"))?;
    let collector = Collector::new(default_fetcher()?, &args.data_dir);
    let scores = collectors::fred::collect_official(&collector, api_key, config).await?;
    for (slug, entry) in &scores.scores {
        info!(slug = %slug, score = entry.score, source = %entry.source, "Official score");
    }
    Ok(())
}

async fn dedupe(data_dir: &Path, config: &Config, min_rows: usize, dry_run: bool) -> error::Result<()> {
    let report = dedupe::dedupe_reddit(data_dir, config, min_rows, dry_run).await?;
    for (slug, removed) in &report.removed_by_topic {
        info!(slug = %slug, removed, "Cross-topic duplicates");
    }
    info!(
        files = report.files_scanned,
        duplicates = report.duplicate_posts,
        removed = report.rows_removed,
        rewritten = report.files_rewritten.len(),
        dry_run,
        "Reddit dedupe complete"
    );
    Ok(())
}

async fn score(data_dir: &Path, config: &Config, args: &ScoreArgs) -> error::Result<Vec<MetricScore>> {
    let fred_scores = official::load_fred_scores(data_dir);
    let scores = aggregate::calculate_all(data_dir, config, &fred_scores, args.min_rows)?;
    for s in &scores {
        info!(
            slug = %s.slug,
            score = s.final_score,
            l1 = s.levels.level1,
            l2 = s.levels.level2,
            l3 = s.levels.level3,
            sources = %s.sources().join(", "),
            "Final score"
        );
    }
    info!(topics = scores.len(), skipped = config.metrics.len() - scores.len(), "Scoring complete");
    if let Some(path) = &args.json_out {
        outputs::json::write_scores(&scores, path).await?;
        info!(path = %path.display(), "Wrote scores JSON");
    }
    Ok(scores)
}

async fn publish(ts_file: &Path, scores: &[MetricScore]) -> error::Result<()> {
    if scores.is_empty() {
        warn!("No scores to publish; leaving dashboard file untouched");
        return Ok(());
    }
    let report = publish::publish_scores(ts_file, scores).await?;
    for (name, trend) in &report.updated {
        info!(metric = %name, %trend, "Updated metric");
    }
    for name in &report.missing {
        warn!(metric = %name, "Metric not found in dashboard file");
    }
    Ok(())
}

/// The weekly pipeline. Collection and official-score failures are logged
/// and the run carries on with whatever is on disk.
#[instrument(level = "info", skip(args, config, score_args, ts_file))]
async fn update(
    args: &Cli,
    config: &Config,
    skip_collect: bool,
    no_publish: bool,
    score_args: &ScoreArgs,
    ts_file: &Path,
) -> error::Result<()> {
    if skip_collect {
        info!("Skipping collection");
    } else {
        let stage = Instant::now();
        let topics = topic_selection(config, None)?;
        if let Err(e) = collect(args, CollectorKind::All, &topics).await {
            error!(error = %e, "Collection failed; scoring existing data");
        }
        info!(stage = "collect", secs = stage.elapsed().as_secs(), "Stage done");
    }

    let stage = Instant::now();
    if args.fred_api_key.is_some() {
        if let Err(e) = official(args, config).await {
            warn!(error = %e, "Official scores not refreshed");
        }
    } else {
        info!("FRED_API_KEY not set; keeping existing official scores");
    }
    info!(stage = "official", secs = stage.elapsed().as_secs(), "Stage done");

    let stage = Instant::now();
    dedupe(&args.data_dir, config, score_args.min_rows, false).await?;
    info!(stage = "dedupe", secs = stage.elapsed().as_secs(), "Stage done");

    let stage = Instant::now();
    let scores = score(&args.data_dir, config, score_args).await?;
    info!(stage = "score", secs = stage.elapsed().as_secs(), topics = scores.len(), "Stage done");

    if no_publish {
        info!("Skipping publish");
        return Ok(());
    }
    let stage = Instant::now();
    publish(ts_file, &scores).await?;
    info!(stage = "publish", secs = stage.elapsed().as_secs(), "Stage done");
    Ok(())
}
