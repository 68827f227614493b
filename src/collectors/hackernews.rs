//! Hacker News stories via the Algolia search API (no key needed).
//!
//! Stories from the last 90 days are categorized by title only.

use super::http::FetchAsync;
use super::{CollectReport, Collector, queries};
use crate::categorize::presets;
use crate::error::Result;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

pub const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search";
pub const LOOKBACK_DAYS: i64 = 90;
pub const HITS_PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub points: Option<u64>,
    pub num_comments: Option<u64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRow {
    pub title: String,
    pub url: String,
    pub points: u64,
    pub num_comments: u64,
    pub category: String,
    pub created_at: String,
    pub search_term: String,
    pub metric: String,
}

pub fn search_url(term: &str, since_epoch: i64) -> Result<Url> {
    Ok(Url::parse_with_params(
        SEARCH_URL,
        &[
            ("query", term.to_string()),
            ("tags", "story".to_string()),
            ("numericFilters", format!("created_at_i>{since_epoch}")),
            ("hitsPerPage", HITS_PER_PAGE.to_string()),
        ],
    )?)
}

/// Rows for one search response. `seen` dedupes story IDs across terms.
pub fn build_rows(slug: &str, term: &str, hits: Vec<Hit>, seen: &mut HashSet<String>) -> Vec<StoryRow> {
    let mut rows = Vec::new();
    for hit in hits {
        if !seen.insert(hit.object_id.clone()) {
            continue;
        }
        let title = hit.title.unwrap_or_default();
        let Some(category) = presets::HACKER_NEWS.categorize(&title) else {
            continue;
        };
        let url = hit
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", hit.object_id));
        rows.push(StoryRow {
            title,
            url,
            points: hit.points.unwrap_or(0),
            num_comments: hit.num_comments.unwrap_or(0),
            category: category.to_string(),
            created_at: hit.created_at.unwrap_or_default(),
            search_term: term.to_string(),
            metric: slug.to_string(),
        });
    }
    rows
}

#[instrument(level = "info", skip(collector))]
pub async fn collect_topic<F: FetchAsync>(collector: &Collector<F>, slug: &str) -> Result<Vec<StoryRow>> {
    let terms = queries::for_topic(slug).map(|q| q.hackernews).unwrap_or(&[]);
    let since = (Utc::now() - Duration::days(LOOKBACK_DAYS)).timestamp();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for term in terms {
        let url = search_url(term, since)?;
        let Some(resp) = collector.get_json::<SearchResponse>(&url).await else {
            continue;
        };
        let found = build_rows(slug, term, resp.hits, &mut seen);
        debug!(term, new = found.len(), "Searched Hacker News");
        rows.extend(found);
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    for slug in slugs {
        if queries::for_topic(slug).is_none_or(|q| q.hackernews.is_empty()) {
            debug!(slug = %slug, "No Hacker News terms for topic");
            continue;
        }
        let rows = collect_topic(collector, slug).await?;
        info!(slug = %slug, rows = rows.len(), "Hacker News collection done");
        let written = collector.save(slug, "hackernews", &rows).await?;
        report.record(written, rows.len());
    }
    Ok(report)
}
