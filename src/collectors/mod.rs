//! Source collectors.
//!
//! Every collector follows the same shape:
//! - build search URLs from the per-topic terms in [`queries`]
//! - fetch and decode each response through a shared [`Collector`]
//! - turn decoded items into serde row structs (pure functions, tested
//!   against JSON fixtures)
//! - write one timestamped CSV per topic via [`crate::outputs::snapshot`]
//!
//! Requests run one at a time with a polite pause between them. A failed
//! request is logged and skipped; it never aborts the run.

pub mod appstore;
pub mod bluesky;
pub mod cfpb;
pub mod fred;
pub mod hackernews;
pub mod http;
pub mod queries;
pub mod reddit;
pub mod youtube;

use crate::error::{Error, Result};
use crate::outputs::snapshot::write_snapshot;
use crate::utils::{file_timestamp, snapshot_name, truncate_for_log};
use http::{FetchAsync, redact};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

/// Pause between consecutive requests.
pub const POLITE_DELAY: Duration = Duration::from_secs(1);

/// Which collector(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CollectorKind {
    Youtube,
    Tiktok,
    Reddit,
    Bluesky,
    Hackernews,
    Cfpb,
    Appstore,
    All,
}

impl CollectorKind {
    /// Concrete collectors, in the order `all` runs them.
    pub const EACH: [CollectorKind; 7] = [
        CollectorKind::Youtube,
        CollectorKind::Tiktok,
        CollectorKind::Reddit,
        CollectorKind::Bluesky,
        CollectorKind::Hackernews,
        CollectorKind::Cfpb,
        CollectorKind::Appstore,
    ];
}

/// Shared fetch/decode/write plumbing for one collection run.
#[derive(Debug)]
pub struct Collector<F> {
    fetcher: F,
    data_dir: PathBuf,
    delay: Duration,
    timestamp: String,
}

impl<F: FetchAsync> Collector<F> {
    pub fn new(fetcher: F, data_dir: &Path) -> Self {
        Self {
            fetcher,
            data_dir: data_dir.to_path_buf(),
            delay: POLITE_DELAY,
            timestamp: file_timestamp(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Fetch and decode `url`. Failures are logged and yield `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Option<T> {
        let fetched = self.fetcher.fetch(url).await;
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %redact(url), error = %e, "Request failed; skipping");
                return None;
            }
        };
        match serde_json::from_str::<T>(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    url = %redact(url),
                    error = %e,
                    body_preview = %truncate_for_log(&body, 300),
                    "Response did not decode; skipping"
                );
                None
            }
        }
    }

    /// Write `{slug}_{source}_{timestamp}.csv`; nothing is written for zero rows.
    pub async fn save<T: Serialize>(&self, slug: &str, source: &str, rows: &[T]) -> Result<Option<PathBuf>> {
        self.save_as(&snapshot_name(slug, source, &self.timestamp), rows).await
    }

    /// Write `{prefix}_{timestamp}.csv`, for files that span topics.
    pub async fn save_combined<T: Serialize>(&self, prefix: &str, rows: &[T]) -> Result<Option<PathBuf>> {
        self.save_as(&format!("{prefix}_{}.csv", self.timestamp), rows).await
    }

    async fn save_as<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<Option<PathBuf>> {
        let written = write_snapshot(&self.data_dir, name, rows).await?;
        if written.is_some() {
            info!(file = name, rows = rows.len(), "Saved collection");
        }
        Ok(written)
    }
}

/// Outcome of collecting one source.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectReport {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

impl CollectReport {
    pub fn record(&mut self, written: Option<PathBuf>, rows: usize) {
        if let Some(path) = written {
            self.files.push(path);
            self.rows += rows;
        }
    }

    pub fn merge(&mut self, other: CollectReport) {
        self.files.extend(other.files);
        self.rows += other.rows;
    }
}

/// Topics a collection run covers.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSelection {
    /// Every configured topic slug.
    pub configured: Vec<String>,
    /// `--topic`, when given.
    pub only: Option<String>,
}

impl TopicSelection {
    pub fn all(configured: Vec<String>) -> Self {
        Self { configured, only: None }
    }

    /// Slugs per-topic collectors should run for.
    pub fn slugs(&self) -> Vec<String> {
        match &self.only {
            Some(slug) => vec![slug.clone()],
            None => self.configured.clone(),
        }
    }
}

/// Run one collector over `topics`.
///
/// The combined TikTok file is the only TikTok snapshot scoring reads, so
/// it is always collected for every configured topic.
pub async fn run<F: FetchAsync>(
    kind: CollectorKind,
    collector: &Collector<F>,
    topics: &TopicSelection,
    youtube_api_key: Option<&str>,
) -> Result<CollectReport> {
    let youtube_key = || youtube_api_key.ok_or(Error::MissingApiKey("YOUTUBE_API_KEY"));
    let slugs = topics.slugs();
    match kind {
        CollectorKind::Youtube => youtube::run(collector, youtube_key()?, &slugs).await,
        CollectorKind::Tiktok => {
            let key = youtube_key()?;
            if let Some(only) = &topics.only {
                warn!(topic = %only, "TikTok file spans every topic; collecting all of them");
            }
            youtube::run_tiktok(collector, key, &topics.configured).await
        }
        CollectorKind::Reddit => reddit::run(collector, &slugs).await,
        CollectorKind::Bluesky => bluesky::run(collector, &slugs).await,
        CollectorKind::Hackernews => hackernews::run(collector, &slugs).await,
        CollectorKind::Cfpb => cfpb::run(collector, &slugs).await,
        CollectorKind::Appstore => appstore::run(collector, &slugs).await,
        CollectorKind::All => {
            let mut report = CollectReport::default();
            for one in CollectorKind::EACH {
                if matches!(one, CollectorKind::Youtube | CollectorKind::Tiktok) && youtube_api_key.is_none() {
                    warn!(collector = ?one, "YOUTUBE_API_KEY not set; skipping");
                    continue;
                }
                match Box::pin(run(one, collector, topics, youtube_api_key)).await {
                    Ok(r) => report.merge(r),
                    Err(e) => warn!(collector = ?one, error = %e, "Collector failed; continuing"),
                }
            }
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::http::testing::CannedFetcher;
    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: u32,
    }

    #[tokio::test]
    async fn test_get_json_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CannedFetcher::default()
            .with("good", r#"{"id": 7}"#)
            .with("bad-json", "not json");
        let c = Collector::new(fetcher, dir.path()).with_delay(Duration::ZERO);

        #[derive(serde::Deserialize)]
        struct Doc {
            id: u32,
        }

        let good: Option<Doc> = c.get_json(&Url::parse("https://x.test/good").unwrap()).await;
        assert_eq!(good.unwrap().id, 7);
        let bad: Option<Doc> = c.get_json(&Url::parse("https://x.test/bad-json").unwrap()).await;
        assert!(bad.is_none());
        let missing: Option<Doc> = c.get_json(&Url::parse("https://x.test/missing").unwrap()).await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_save_names_file_and_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let c = Collector::new(CannedFetcher::default(), dir.path());
        let path = c.save("healthcare", "cfpb", &[Item { id: 1 }]).await.unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("healthcare_cfpb_") && name.ends_with(".csv"), "{name}");

        let empty: Vec<Item> = vec![];
        assert!(c.save("healthcare", "cfpb", &empty).await.unwrap().is_none());
    }

    #[test]
    fn test_topic_selection_slugs() {
        let configured = vec!["healthcare".to_string(), "layoff_watch".to_string()];
        assert_eq!(TopicSelection::all(configured.clone()).slugs(), configured);
        let one = TopicSelection {
            configured,
            only: Some("layoff_watch".into()),
        };
        assert_eq!(one.slugs(), vec!["layoff_watch".to_string()]);
    }

    #[tokio::test]
    async fn test_youtube_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let c = Collector::new(CannedFetcher::default(), dir.path());
        let topics = TopicSelection::all(vec!["healthcare".into()]);
        let err = run(CollectorKind::Youtube, &c, &topics, None).await;
        assert!(matches!(err, Err(Error::MissingApiKey("YOUTUBE_API_KEY"))));
    }
}
