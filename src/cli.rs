//! Command-line interface definitions for the Absurdity Index pipeline.
//!
//! Global options and API keys can also come from environment variables.

use crate::collectors::CollectorKind;
use crate::discovery::DEFAULT_MIN_ROWS;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Absurdity Index pipeline.
///
/// # Examples
///
/// ```sh
/// # Collect Reddit posts for one topic
/// absurdity_index collect reddit --topic housing_despair
///
/// # Score every topic and keep a JSON summary
/// absurdity_index score --json-out scores.json
///
/// # The whole weekly run
/// YOUTUBE_API_KEY=... FRED_API_KEY=... absurdity_index update
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding collected CSV snapshots and official_scores.json
    #[arg(short, long, global = true, env = "ABSURDITY_DATA_DIR", default_value = "collected-data")]
    pub data_dir: PathBuf,

    /// Optional path to a YAML or JSON config file
    #[arg(short, long, global = true, env = "ABSURDITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// YouTube Data API v3 key (YouTube and TikTok collectors)
    #[arg(long, global = true, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// FRED API key (official scores)
    #[arg(long, global = true, env = "FRED_API_KEY", hide_env_values = true)]
    pub fred_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one collector, or all of them
    Collect {
        #[arg(value_enum)]
        source: CollectorKind,

        /// Limit collection to one topic slug
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// Fetch FRED series and write official_scores.json
    Official,

    /// Keep each Reddit post in only its best-matching topic
    Dedupe {
        /// Report what would change without rewriting files
        #[arg(long)]
        dry_run: bool,

        /// Skip Reddit snapshots with fewer data rows than this (match `score`)
        #[arg(long, default_value_t = DEFAULT_MIN_ROWS)]
        min_rows: usize,
    },

    /// Compute final scores from the latest snapshots
    Score(ScoreArgs),

    /// Score and rewrite the dashboard data file
    Publish {
        #[command(flatten)]
        score: ScoreArgs,

        #[arg(long, env = "ABSURDITY_TS_FILE", default_value = "lib/metricDetailData.ts")]
        ts_file: PathBuf,
    },

    /// Weekly run: collect, official scores, dedupe, score, publish
    Update {
        /// Score what is already on disk
        #[arg(long)]
        skip_collect: bool,

        /// Stop after scoring
        #[arg(long)]
        no_publish: bool,

        #[command(flatten)]
        score: ScoreArgs,

        #[arg(long, env = "ABSURDITY_TS_FILE", default_value = "lib/metricDetailData.ts")]
        ts_file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Also write a JSON summary of the scores here
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Ignore snapshot files with fewer data rows than this
    #[arg(long, default_value_t = DEFAULT_MIN_ROWS)]
    pub min_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_parsing() {
        let cli = Cli::parse_from(["absurdity_index", "collect", "reddit", "--topic", "housing_despair"]);
        assert_eq!(cli.data_dir, PathBuf::from("collected-data"));
        match cli.command {
            Command::Collect { source, topic } => {
                assert_eq!(source, CollectorKind::Reddit);
                assert_eq!(topic.as_deref(), Some("housing_despair"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["absurdity_index", "dedupe", "--dry-run", "-d", "/tmp/data"]);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/data"));
        assert!(matches!(
            cli.command,
            Command::Dedupe {
                dry_run: true,
                min_rows: DEFAULT_MIN_ROWS
            }
        ));
    }

    #[test]
    fn test_score_defaults() {
        let cli = Cli::parse_from(["absurdity_index", "score"]);
        let Command::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert_eq!(args.min_rows, DEFAULT_MIN_ROWS);
        assert!(args.json_out.is_none());
    }

    #[test]
    fn test_update_flags() {
        let cli = Cli::parse_from([
            "absurdity_index",
            "update",
            "--skip-collect",
            "--no-publish",
            "--min-rows",
            "0",
            "--ts-file",
            "site/lib/metricDetailData.ts",
        ]);
        let Command::Update {
            skip_collect,
            no_publish,
            score,
            ts_file,
        } = cli.command
        else {
            panic!("expected update");
        };
        assert!(skip_collect && no_publish);
        assert_eq!(score.min_rows, 0);
        assert_eq!(ts_file, PathBuf::from("site/lib/metricDetailData.ts"));
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["absurdity_index", "collect", "myspace"]).is_err());
    }
}
