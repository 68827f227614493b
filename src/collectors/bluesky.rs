//! Bluesky posts via the public `app.bsky.feed.searchPosts` endpoint.

use super::http::FetchAsync;
use super::{CollectReport, Collector, queries};
use crate::categorize::{KeywordRules, presets};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const SEARCH_URL: &str = "https://public.api.bsky.app/xrpc/app.bsky.feed.searchPosts";
pub const SEARCH_LIMIT: u32 = 100;
const TEXT_MAX_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub uri: String,
    #[serde(default)]
    pub record: Record,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub repost_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRow {
    pub uri: String,
    pub text: String,
    pub author_handle: String,
    pub like_count: u64,
    pub reply_count: u64,
    pub repost_count: u64,
    pub category: String,
    pub created_at: String,
    pub search_term: String,
    pub metric: String,
}

pub fn search_url(term: &str) -> Result<Url> {
    Ok(Url::parse_with_params(
        SEARCH_URL,
        &[("q", term), ("limit", SEARCH_LIMIT.to_string().as_str()), ("sort", "top")],
    )?)
}

pub fn build_rows(
    slug: &str,
    term: &str,
    rules: &KeywordRules,
    posts: Vec<Post>,
    seen: &mut HashSet<String>,
) -> Vec<PostRow> {
    let mut rows = Vec::new();
    for post in posts {
        if seen.contains(&post.uri) {
            continue;
        }
        let Some(category) = rules.categorize(&post.record.text) else {
            continue;
        };
        seen.insert(post.uri.clone());
        rows.push(PostRow {
            uri: post.uri,
            text: post.record.text.chars().take(TEXT_MAX_CHARS).collect(),
            author_handle: post.author.handle,
            like_count: post.like_count,
            reply_count: post.reply_count,
            repost_count: post.repost_count,
            category: category.to_string(),
            created_at: post.record.created_at,
            search_term: term.to_string(),
            metric: slug.to_string(),
        });
    }
    rows
}

#[instrument(level = "info", skip(collector))]
pub async fn collect_topic<F: FetchAsync>(collector: &Collector<F>, slug: &str) -> Result<Vec<PostRow>> {
    let (Some(q), Some(rules)) = (queries::for_topic(slug), presets::topic(slug)) else {
        warn!("Unknown topic for Bluesky");
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for term in q.bluesky {
        let url = search_url(term)?;
        let Some(resp) = collector.get_json::<SearchResponse>(&url).await else {
            continue;
        };
        let found = build_rows(slug, term, &rules, resp.posts, &mut seen);
        debug!(term, new = found.len(), "Searched Bluesky");
        rows.extend(found);
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    for slug in slugs {
        let rows = collect_topic(collector, slug).await?;
        info!(slug = %slug, rows = rows.len(), "Bluesky collection done");
        let written = collector.save(slug, "bluesky", &rows).await?;
        report.record(written, rows.len());
    }
    Ok(report)
}
