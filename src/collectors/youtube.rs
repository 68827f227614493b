//! YouTube Data API v3 collectors.
//!
//! Two passes share the same search + `videos.list` plumbing:
//! - [`run`] writes `{slug}_youtube_*.csv` from each topic's YouTube terms
//! - [`run_tiktok`] searches for re-uploaded TikTok compilations and writes
//!   one combined `tiktok_youtube_*.csv` with a `metric` column
//!
//! Both need `YOUTUBE_API_KEY`. The key is sent as a query parameter, so
//! URLs are redacted before they reach the logs.

use super::http::FetchAsync;
use super::{CollectReport, Collector, queries};
use crate::categorize::{filters, presets};
use crate::error::Result;
use crate::scoring::round_to;
use crate::utils::snippet;
use chrono::{Duration, Local, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
pub const LOOKBACK_DAYS: i64 = 90;
pub const TIKTOK_LOOKBACK_DAYS: i64 = 365;
pub const MAX_RESULTS: u32 = 10;
pub const TIKTOK_MAX_RESULTS: u32 = 15;
/// File prefix of the combined TikTok snapshot.
pub const TIKTOK_PREFIX: &str = "tiktok_youtube";
const KEYWORD_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
}

/// The API returns counts as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

fn count(raw: &Option<String>) -> u64 {
    raw.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
}

impl Video {
    fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    fn published_date(&self) -> String {
        self.snippet.published_at.chars().take(10).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRow {
    pub search_term: String,
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub channel: String,
    pub description_snippet: String,
    pub published_date: String,
    pub view_count: u64,
    pub crisis_keywords: String,
    pub category: String,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TikTokRow {
    pub metric: String,
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub engagement_score: f64,
    pub category: String,
    pub published: String,
    pub collected_date: String,
    pub source: String,
}

pub fn search_url(term: &str, api_key: &str, max_results: u32, lookback_days: i64) -> Result<Url> {
    let after = (Utc::now() - Duration::days(lookback_days)).format("%Y-%m-%dT%H:%M:%SZ").to_string();
    Ok(Url::parse_with_params(
        SEARCH_URL,
        &[
            ("part", "snippet"),
            ("type", "video"),
            ("q", term),
            ("maxResults", max_results.to_string().as_str()),
            ("order", "relevance"),
            ("regionCode", "US"),
            ("relevanceLanguage", "en"),
            ("publishedAfter", after.as_str()),
            ("key", api_key),
        ],
    )?)
}

pub fn videos_url(ids: &[String], api_key: &str) -> Result<Url> {
    Ok(Url::parse_with_params(
        VIDEOS_URL,
        &[
            ("part", "snippet,statistics"),
            ("id", ids.iter().join(",").as_str()),
            ("key", api_key),
        ],
    )?)
}

/// Likes plus double-weighted comments per view, scaled by log10 of views.
pub fn engagement_score(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let rate = (likes as f64 + comments as f64 * 2.0) / views as f64;
    round_to(rate * (views as f64).log10() * 100.0, 2)
}

pub fn build_rows(slug: &str, term: &str, videos: Vec<Video>, seen: &mut HashSet<String>) -> Vec<VideoRow> {
    let Some(rules) = presets::topic(slug) else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    for video in videos {
        if !seen.insert(video.id.clone()) {
            continue;
        }
        let s = &video.snippet;
        if !filters::filter_content(&s.title, &s.description, &s.channel_title) {
            continue;
        }
        let Some(category) = rules.categorize_parts(&s.title, &s.description) else {
            continue;
        };
        let keywords = rules.matched_keywords(&format!("{} {}", s.title, s.description), KEYWORD_LIMIT);
        rows.push(VideoRow {
            search_term: term.to_string(),
            url: video.url(),
            published_date: video.published_date(),
            title: s.title.clone(),
            channel: s.channel_title.clone(),
            description_snippet: snippet(&s.description, 200),
            view_count: count(&video.statistics.view_count),
            crisis_keywords: keywords.join(", "),
            category: category.to_string(),
            metric: slug.to_string(),
            video_id: video.id,
        });
    }
    rows
}

/// TikTok compilations are labelled from the title alone; the description is
/// only consulted by the content filter.
pub fn build_tiktok_rows(
    slug: &str,
    videos: Vec<Video>,
    collected_date: &str,
    seen: &mut HashSet<String>,
) -> Vec<TikTokRow> {
    let mut rows = Vec::new();
    for video in videos {
        if !seen.insert(video.id.clone()) {
            continue;
        }
        let s = &video.snippet;
        let description: String = s.description.chars().take(500).collect();
        if !filters::filter_content(&s.title, &description, "") {
            continue;
        }
        let Some(category) = presets::TIKTOK.categorize(&s.title) else {
            continue;
        };
        let views = count(&video.statistics.view_count);
        let likes = count(&video.statistics.like_count);
        let comments = count(&video.statistics.comment_count);
        rows.push(TikTokRow {
            metric: slug.to_string(),
            url: video.url(),
            published: video.published_date(),
            title: s.title.chars().take(200).collect(),
            channel: s.channel_title.clone(),
            description,
            views,
            likes,
            comments,
            engagement_score: engagement_score(views, likes, comments),
            category: category.to_string(),
            collected_date: collected_date.to_string(),
            source: "youtube_tiktok_compilation".to_string(),
            video_id: video.id,
        });
    }
    rows
}

/// Search, then fetch snippet and statistics for the hits in one call.
async fn search_videos<F: FetchAsync>(collector: &Collector<F>, search: &Url, api_key: &str) -> Result<Vec<Video>> {
    let Some(found) = collector.get_json::<SearchResponse>(search).await else {
        return Ok(Vec::new());
    };
    let ids: Vec<String> = found.items.into_iter().filter_map(|i| i.id.video_id).unique().collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let details = collector.get_json::<VideosResponse>(&videos_url(&ids, api_key)?).await;
    Ok(details.map(|d| d.items).unwrap_or_default())
}

#[instrument(level = "info", skip(collector, api_key))]
pub async fn collect_topic<F: FetchAsync>(collector: &Collector<F>, api_key: &str, slug: &str) -> Result<Vec<VideoRow>> {
    let Some(q) = queries::for_topic(slug) else {
        warn!("Unknown topic for YouTube");
        return Ok(Vec::new());
    };
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for term in q.youtube {
        let url = search_url(term, api_key, MAX_RESULTS, LOOKBACK_DAYS)?;
        let found = build_rows(slug, term, search_videos(collector, &url, api_key).await?, &mut seen);
        debug!(term, new = found.len(), "Searched YouTube");
        rows.extend(found);
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, api_key: &str, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    for slug in slugs {
        let rows = collect_topic(collector, api_key, slug).await?;
        info!(slug = %slug, rows = rows.len(), "YouTube collection done");
        let written = collector.save(slug, "youtube", &rows).await?;
        report.record(written, rows.len());
    }
    Ok(report)
}

/// One combined file for every topic in `slugs`.
#[instrument(level = "info", skip_all, fields(topics = slugs.len()))]
pub async fn run_tiktok<F: FetchAsync>(collector: &Collector<F>, api_key: &str, slugs: &[String]) -> Result<CollectReport> {
    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut rows = Vec::new();

    for slug in slugs {
        let Some(q) = queries::for_topic(slug) else {
            warn!(slug = %slug, "Unknown topic for TikTok");
            continue;
        };
        let mut seen = HashSet::new();
        let before = rows.len();
        for term in q.tiktok {
            let url = search_url(term, api_key, TIKTOK_MAX_RESULTS, TIKTOK_LOOKBACK_DAYS)?;
            let videos = search_videos(collector, &url, api_key).await?;
            rows.extend(build_tiktok_rows(slug, videos, &today, &mut seen));
        }
        info!(slug = %slug, rows = rows.len() - before, "TikTok compilations collected");
    }

    let mut report = CollectReport::default();
    let written = collector.save_combined(TIKTOK_PREFIX, &rows).await?;
    report.record(written, rows.len());
    Ok(report)
}
