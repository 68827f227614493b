//! Reddit posts via the public `search.json` endpoints (no OAuth).
//!
//! Each topic searches its subreddits with its Reddit terms. Posts must
//! mention the topic's vocabulary to be kept, since subreddit search drifts.

use super::http::FetchAsync;
use super::{CollectReport, Collector, queries};
use crate::categorize::{KeywordRules, presets};
use crate::error::Result;
use crate::utils::snippet;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const POSTS_PER_TERM: u32 = 10;
const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub struct Child {
    pub data: Post,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub permalink: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedditRow {
    pub subreddit: String,
    pub post_id: String,
    pub title: String,
    pub selftext_snippet: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u64,
    pub author: String,
    pub created_date: String,
    pub search_term: String,
    pub category: String,
    pub metric: String,
}

pub fn search_url(subreddit: &str, term: &str) -> Result<Url> {
    let base = format!("https://www.reddit.com/r/{subreddit}/search.json");
    Ok(Url::parse_with_params(
        &base,
        &[
            ("q", term),
            ("restrict_sr", "1"),
            ("sort", "top"),
            ("t", "month"),
            ("limit", POSTS_PER_TERM.to_string().as_str()),
        ],
    )?)
}

fn created_date(created_utc: f64) -> String {
    DateTime::from_timestamp(created_utc as i64, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Rows for one search response. `seen` dedupes post IDs across the topic.
pub fn build_rows(
    slug: &str,
    subreddit: &str,
    term: &str,
    rules: &KeywordRules,
    children: Vec<Child>,
    seen: &mut HashSet<String>,
) -> Vec<RedditRow> {
    let mut rows = Vec::new();
    for Child { data: post } in children {
        if !seen.insert(post.id.clone()) {
            continue;
        }
        let Some(category) = rules.categorize_parts(&post.title, &post.selftext) else {
            continue;
        };
        rows.push(RedditRow {
            subreddit: subreddit.to_string(),
            url: format!("https://www.reddit.com{}", post.permalink),
            selftext_snippet: snippet(&post.selftext, SNIPPET_CHARS),
            post_id: post.id,
            title: post.title,
            score: post.score,
            num_comments: post.num_comments,
            author: post.author.unwrap_or_else(|| "[deleted]".to_string()),
            created_date: created_date(post.created_utc),
            search_term: term.to_string(),
            category: category.to_string(),
            metric: slug.to_string(),
        });
    }
    rows
}

#[instrument(level = "info", skip(collector))]
pub async fn collect_topic<F: FetchAsync>(collector: &Collector<F>, slug: &str) -> Result<Vec<RedditRow>> {
    let (Some(q), Some(rules)) = (queries::for_topic(slug), presets::topic_with_relevance(slug)) else {
        warn!("Unknown topic for Reddit");
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for subreddit in q.subreddits {
        let before = rows.len();
        for term in q.reddit {
            let url = search_url(subreddit, term)?;
            let Some(listing) = collector.get_json::<Listing>(&url).await else {
                continue;
            };
            rows.extend(build_rows(slug, subreddit, term, &rules, listing.data.children, &mut seen));
        }
        debug!(subreddit, new = rows.len() - before, "Searched subreddit");
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    for slug in slugs {
        let rows = collect_topic(collector, slug).await?;
        info!(slug = %slug, rows = rows.len(), "Reddit collection done");
        let written = collector.save(slug, "reddit", &rows).await?;
        report.record(written, rows.len());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::super::http::testing::CannedFetcher;
    use super::*;
    use crate::discovery::read_snapshot;

    const FIXTURE: &str = r#"{
      "kind": "Listing",
      "data": {
        "children": [
          {"kind": "t3", "data": {"id": "abc", "title": "Facing eviction next week", "selftext": "Landlord   filed\nyesterday.",
            "score": 250, "num_comments": 40, "created_utc": 1738368000.0, "author": "renter1", "permalink": "/r/renters/comments/abc/"}},
          {"kind": "t3", "data": {"id": "def", "title": "Rent increase again", "selftext": "",
            "score": 12, "num_comments": 3, "created_utc": 1738454400.0, "author": null, "permalink": "/r/renters/comments/def/"}},
          {"kind": "t3", "data": {"id": "ghi", "title": "My cat knocked over a plant", "selftext": "lol",
            "score": 999, "num_comments": 1, "created_utc": 1738454400.0, "permalink": "/r/renters/comments/ghi/"}}
        ]
      }
    }"#;

    fn children() -> Vec<Child> {
        serde_json::from_str::<Listing>(FIXTURE).unwrap().data.children
    }

    #[test]
    fn test_build_rows_gates_on_relevance() {
        let rules = presets::topic_with_relevance("housing_despair").unwrap();
        let mut seen = HashSet::new();
        let rows = build_rows("housing_despair", "renters", "eviction", &rules, children(), &mut seen);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "LEVEL_3_CRISIS");
        assert_eq!(rows[0].selftext_snippet, "Landlord filed yesterday.");
        assert_eq!(rows[0].url, "https://www.reddit.com/r/renters/comments/abc/");
        assert_eq!(rows[0].created_date, "2025-02-01");
        assert_eq!(rows[1].category, "LEVEL_2_FRUSTRATED");
        assert_eq!(rows[1].author, "[deleted]");
    }

    #[test]
    fn test_search_url() {
        let url = search_url("renters", "rent increase").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/renters/search.json?q=rent+increase&restrict_sr=1&sort=top&t=month&limit=10"
        );
    }

    #[tokio::test]
    async fn test_run_dedupes_across_subreddits_and_terms() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CannedFetcher::default().with("reddit.com", FIXTURE);
        let c = Collector::new(fetcher, dir.path()).with_delay(std::time::Duration::ZERO);

        let report = run(&c, &["housing_despair".into()]).await.unwrap();
        assert_eq!(report.rows, 2);

        let snap = read_snapshot(&report.files[0]).unwrap();
        assert!(snap.headers.contains(&"selftext_snippet".to_string()));
        assert_eq!(snap.rows[0]["post_id"], "abc");
    }
}
