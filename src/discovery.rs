//! Locating and reading the newest usable CSV snapshot per topic and source.
//!
//! Snapshot names embed a `YYYYMMDD_HHMMSS` timestamp, so a descending sort
//! of file names is newest-first. Files with too few data rows are treated
//! as failed collections and skipped.

use crate::config::MetricConfig;
use crate::error::Result;
use crate::models::{Row, Source};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Minimum data rows for a snapshot to be considered.
pub const DEFAULT_MIN_ROWS: usize = 5;

/// Combined TikTok-compilation snapshot covering every topic.
pub const TIKTOK_PATTERN: &str = "tiktok_youtube_*.csv";

/// A parsed CSV file with its header order preserved.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// A snapshot chosen for one source of one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub source: Source,
    pub path: PathBuf,
}

/// Non-header rows in a CSV file; unreadable files count as 0.
pub fn count_data_rows(path: &Path) -> usize {
    match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(mut reader) => reader.records().filter(|r| r.is_ok()).count(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not open CSV");
            0
        }
    }
}

/// All files in `dir` matching `pattern`, newest first.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let mut matches: Vec<PathBuf> = glob::glob(&full)?.filter_map(|p| p.ok()).collect();
    matches.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(matches)
}

/// Newest file matching `pattern` that has at least `min_rows` data rows.
#[instrument(level = "debug", skip(dir), fields(dir = %dir.display()))]
pub fn find_latest_file(dir: &Path, pattern: &str, min_rows: usize) -> Result<Option<PathBuf>> {
    for path in matching_files(dir, pattern)? {
        let rows = count_data_rows(&path);
        if rows >= min_rows {
            return Ok(Some(path));
        }
        info!(
            file = %path.file_name().unwrap_or_default().to_string_lossy(),
            rows,
            min_rows,
            "Skipping snapshot with too few rows"
        );
    }
    Ok(None)
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(String::from))
            .collect();
        rows.push(row);
    }

    Ok(Snapshot {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Latest usable snapshot for every per-topic source of `metric`.
pub fn find_metric_files(dir: &Path, metric: &MetricConfig, min_rows: usize) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for source in Source::PER_TOPIC {
        let pattern = match source {
            Source::YouTube => metric.youtube_pattern(),
            Source::Reddit => metric.reddit_pattern(),
            other => format!("{}_{}_*.csv", metric.slug, other.slug()),
        };
        if let Some(path) = find_latest_file(dir, &pattern, min_rows)? {
            files.push(SourceFile { source, path });
        }
    }
    Ok(files)
}

/// Rows of the latest combined TikTok snapshot whose `metric` is `slug`.
pub fn tiktok_rows(dir: &Path, slug: &str, min_rows: usize) -> Result<Option<(PathBuf, Vec<Row>)>> {
    let Some(path) = find_latest_file(dir, TIKTOK_PATTERN, min_rows)? else {
        return Ok(None);
    };
    match read_snapshot(&path) {
        Ok(snapshot) => {
            let rows = snapshot
                .rows
                .into_iter()
                .filter(|r| r.get("metric").map(String::as_str) == Some(slug))
                .collect();
            Ok(Some((path, rows)))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error reading TikTok data");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, name: &str, data_rows: usize) -> PathBuf {
        let mut body = String::from("title,category,views\n");
        for i in 0..data_rows {
            body.push_str(&format!("post {i},LEVEL_1_AWARE,{i}\n"));
        }
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_count_data_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "a.csv", 3);
        assert_eq!(count_data_rows(&path), 3);
        assert_eq!(count_data_rows(&dir.path().join("missing.csv")), 0);
    }

    #[test]
    fn test_latest_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "housing_despair_reddit_20250101_120000.csv", 10);
        let newest = write_csv(dir.path(), "housing_despair_reddit_20250301_080000.csv", 10);
        write_csv(dir.path(), "housing_despair_reddit_20250201_235959.csv", 10);

        let found = find_latest_file(dir.path(), "housing_despair_reddit_*.csv", 5).unwrap();
        assert_eq!(found, Some(newest));
    }

    #[test]
    fn test_skips_files_below_min_rows() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_csv(dir.path(), "layoff_watch_bluesky_20250101_000000.csv", 6);
        write_csv(dir.path(), "layoff_watch_bluesky_20250102_000000.csv", 2);
        write_csv(dir.path(), "layoff_watch_bluesky_20250103_000000.csv", 0);

        let found = find_latest_file(dir.path(), "layoff_watch_bluesky_*.csv", 5).unwrap();
        assert_eq!(found, Some(good));
        assert_eq!(
            find_latest_file(dir.path(), "layoff_watch_bluesky_*.csv", 7).unwrap(),
            None
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_latest_file(dir.path(), "nothing_*.csv", 0).unwrap(), None);
    }

    #[test]
    fn test_find_metric_files_across_sources() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "healthcare_youtube_20250101_000000.csv", 5);
        write_csv(dir.path(), "healthcare_cfpb_20250101_000000.csv", 5);
        write_csv(dir.path(), "healthcare_bluesky_20250101_000000.csv", 1);
        write_csv(dir.path(), "layoff_watch_reddit_20250101_000000.csv", 5);

        let config = crate::config::Config::default();
        let metric = config.metric("healthcare").unwrap();
        let files = find_metric_files(dir.path(), metric, 5).unwrap();
        let sources: Vec<Source> = files.iter().map(|f| f.source).collect();
        assert_eq!(sources, vec![Source::YouTube, Source::Cfpb]);
    }

    #[test]
    fn test_read_snapshot_preserves_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "x.csv", 2);
        let snap = read_snapshot(&path).unwrap();
        assert_eq!(snap.headers, vec!["title", "category", "views"]);
        assert_eq!(snap.rows.len(), 2);
        assert_eq!(snap.rows[1]["title"], "post 1");
    }

    #[test]
    fn test_tiktok_rows_filtered_by_metric() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::from("metric,video_id,views,category\n");
        for i in 0..4 {
            body.push_str(&format!("housing_despair,h{i},100,LEVEL_3_CRISIS\n"));
        }
        body.push_str("airline_chaos,a1,5,LEVEL_1_CASUAL\n");
        fs::write(dir.path().join("tiktok_youtube_20250105_101010.csv"), body).unwrap();

        let (_, rows) = tiktok_rows(dir.path(), "housing_despair", 5).unwrap().unwrap();
        assert_eq!(rows.len(), 4);
        let (_, rows) = tiktok_rows(dir.path(), "healthcare", 5).unwrap().unwrap();
        assert!(rows.is_empty());
    }
}
