//! Cross-topic Reddit deduplication.
//!
//! Reddit searches for different topics often return the same post. Each
//! shared post is kept only in the topic whose relevance vocabulary it
//! matches best; the other topics' snapshots are rewritten without it.

use crate::categorize::presets;
use crate::config::Config;
use crate::discovery::{Snapshot, find_latest_file, read_snapshot};
use crate::error::Result;
use crate::outputs::snapshot::rewrite_snapshot;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Columns that may hold a post body, in lookup order.
const BODY_FIELDS: [&str; 3] = ["selftext_snippet", "selftext", "text_snippet"];

const TITLE_HIT: u32 = 3;
const BODY_HIT: u32 = 1;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DedupeReport {
    pub files_scanned: usize,
    /// Post IDs that appeared under more than one topic.
    pub duplicate_posts: usize,
    pub rows_removed: usize,
    /// Rows removed per topic slug.
    pub removed_by_topic: BTreeMap<String, usize>,
    pub files_rewritten: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Relevance of a post to a vocabulary: +3 per keyword in the title, +1 per
/// keyword found only in the body.
pub fn relevance_score(title: &str, body: &str, keywords: &[&str]) -> u32 {
    let title = title.to_lowercase();
    let body = body.to_lowercase();
    keywords
        .iter()
        .map(|kw| {
            if title.contains(kw) {
                TITLE_HIT
            } else if body.contains(kw) {
                BODY_HIT
            } else {
                0
            }
        })
        .sum()
}

/// Highest-scoring topic among `candidates`. Ties go to the slug that sorts
/// last alphabetically.
pub fn best_topic<'a>(title: &str, body: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|slug| {
            let score = relevance_score(title, body, presets::relevance_keywords(slug));
            (score, *slug)
        })
        .max()
        .map(|(_, slug)| slug)
}

fn post_body(row: &crate::models::Row) -> &str {
    BODY_FIELDS
        .iter()
        .filter_map(|f| row.get(*f))
        .find(|v| !v.is_empty())
        .map(String::as_str)
        .unwrap_or("")
}

/// Deduplicate the latest Reddit snapshot of every configured topic.
///
/// `min_rows` must match the value scoring uses, so both pick the same
/// snapshot. A file that drops below `min_rows` after dedupe makes scoring
/// fall back to an older snapshot, which may still hold shared posts.
///
/// With `dry_run` the report is computed but no file is touched.
#[instrument(level = "info", skip(config), fields(dir = %dir.display()))]
pub async fn dedupe_reddit(dir: &Path, config: &Config, min_rows: usize, dry_run: bool) -> Result<DedupeReport> {
    let mut report = DedupeReport {
        dry_run,
        ..Default::default()
    };

    let mut snapshots: Vec<(String, Snapshot)> = Vec::new();
    for metric in &config.metrics {
        let Some(path) = find_latest_file(dir, &metric.reddit_pattern(), min_rows)? else {
            debug!(slug = %metric.slug, "No Reddit snapshot");
            continue;
        };
        match read_snapshot(&path) {
            Ok(snapshot) => snapshots.push((metric.slug.clone(), snapshot)),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not read Reddit snapshot"),
        }
    }
    report.files_scanned = snapshots.len();

    // post_id -> (topics it appears in, title, body of first occurrence)
    let mut index: HashMap<String, (Vec<String>, String, String)> = HashMap::new();
    for (slug, snapshot) in &snapshots {
        for row in &snapshot.rows {
            let Some(id) = row.get("post_id").filter(|id| !id.is_empty()) else {
                continue;
            };
            let entry = index.entry(id.clone()).or_insert_with(|| {
                let title = row.get("title").cloned().unwrap_or_default();
                (Vec::new(), title, post_body(row).to_string())
            });
            if !entry.0.contains(slug) {
                entry.0.push(slug.clone());
            }
        }
    }

    // post_id -> topic that keeps it
    let mut keep_in: HashMap<&str, &str> = HashMap::new();
    for (id, (topics, title, body)) in &index {
        if topics.len() < 2 {
            continue;
        }
        report.duplicate_posts += 1;
        let candidates: Vec<&str> = topics.iter().map(String::as_str).collect();
        if let Some(best) = best_topic(title, body, &candidates) {
            debug!(post_id = %id, keep = best, candidates = ?candidates, "Assigned shared post");
            keep_in.insert(id.as_str(), best);
        }
    }

    for (slug, snapshot) in &snapshots {
        let before = snapshot.rows.len();
        let rows: Vec<_> = snapshot
            .rows
            .iter()
            .filter(|row| {
                row.get("post_id")
                    .and_then(|id| keep_in.get(id.as_str()))
                    .is_none_or(|keep| *keep == slug.as_str())
            })
            .cloned()
            .collect();

        let removed = before - rows.len();
        if removed == 0 {
            continue;
        }
        report.rows_removed += removed;
        report.removed_by_topic.insert(slug.clone(), removed);
        report.files_rewritten.push(snapshot.path.clone());
        info!(slug = %slug, removed, remaining = rows.len(), dry_run, "Removing cross-topic duplicates");

        if !dry_run {
            let updated = Snapshot {
                path: snapshot.path.clone(),
                headers: snapshot.headers.clone(),
                rows,
            };
            rewrite_snapshot(&updated).await?;
        }
    }

    info!(
        files = report.files_scanned,
        duplicates = report.duplicate_posts,
        removed = report.rows_removed,
        dry_run,
        "Deduplication finished"
    );
    Ok(report)
}
