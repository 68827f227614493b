//! App Store reviews of AI companion apps, from the public iTunes RSS feed.
//!
//! Only the `ai_psychosis` topic has an App Store counterpart.

use super::http::FetchAsync;
use super::{CollectReport, Collector};
use crate::categorize::presets;
use crate::error::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

pub const TOPIC: &str = "ai_psychosis";
pub const COUNTRY: &str = "us";
pub const MAX_PAGES: u32 = 10;

/// Tracked apps and their App Store IDs.
pub const APPS: [(&str, &str); 6] = [
    ("Replika", "1158555867"),
    ("Character.AI", "1631797909"),
    ("Chai", "1544750895"),
    ("Anima", "1501283629"),
    ("Paradot", "6447293657"),
    ("Talkie", "6446665746"),
];

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub feed: Feed,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub entry: Entries,
}

/// The feed collapses a single entry into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Entries {
    Many(Vec<Entry>),
    One(Box<Entry>),
}

impl Default for Entries {
    fn default() -> Self {
        Entries::Many(Vec::new())
    }
}

impl Entries {
    /// Reviews only; the first entry of a page describes the app itself.
    pub fn reviews(self) -> Vec<Entry> {
        match self {
            Entries::Many(entries) => entries.into_iter().skip(1).collect(),
            Entries::One(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Label,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Label,
    #[serde(default)]
    pub title: Label,
    #[serde(default)]
    pub content: Label,
    #[serde(rename = "im:rating", default)]
    pub rating: Label,
    #[serde(rename = "im:voteCount", default)]
    pub vote_count: Label,
    #[serde(default)]
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub app_name: String,
    pub app_id: String,
    pub review_id: String,
    pub title: String,
    pub content: String,
    pub rating: String,
    pub likes: u64,
    pub author: String,
    pub category: String,
    pub collected_date: String,
    pub metric: String,
}

pub fn reviews_url(app_id: &str, page: u32) -> Result<Url> {
    Ok(Url::parse(&format!(
        "https://itunes.apple.com/{COUNTRY}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json"
    ))?)
}

pub fn build_rows(app_name: &str, app_id: &str, reviews: Vec<Entry>, collected_date: &str) -> Vec<ReviewRow> {
    reviews
        .into_iter()
        .filter_map(|r| {
            let category = presets::APP_STORE.categorize_parts(&r.title.label, &r.content.label)?;
            let author = if r.author.name.label.is_empty() {
                "Anonymous".to_string()
            } else {
                r.author.name.label
            };
            Some(ReviewRow {
                app_name: app_name.to_string(),
                app_id: app_id.to_string(),
                review_id: r.id.label,
                title: r.title.label.chars().take(200).collect(),
                content: r.content.label.chars().take(500).collect(),
                rating: r.rating.label,
                likes: r.vote_count.label.parse().unwrap_or(0),
                author,
                category: category.to_string(),
                collected_date: collected_date.to_string(),
                metric: TOPIC.to_string(),
            })
        })
        .collect()
}

#[instrument(level = "info", skip(collector))]
pub async fn collect_app<F: FetchAsync>(collector: &Collector<F>, app_name: &str, app_id: &str) -> Result<Vec<ReviewRow>> {
    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut rows = Vec::new();
    for page in 1..=MAX_PAGES {
        let Some(resp) = collector.get_json::<FeedResponse>(&reviews_url(app_id, page)?).await else {
            break;
        };
        let reviews = resp.feed.entry.reviews();
        if reviews.is_empty() {
            break;
        }
        debug!(page, reviews = reviews.len(), "Fetched review page");
        rows.extend(build_rows(app_name, app_id, reviews, &today));
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    if !slugs.iter().any(|s| s == TOPIC) {
        debug!("App Store reviews only cover {TOPIC}");
        return Ok(report);
    }

    let mut rows = Vec::new();
    for (name, id) in APPS {
        let reviews = collect_app(collector, name, id).await?;
        info!(app = name, reviews = reviews.len(), "App Store reviews collected");
        rows.extend(reviews);
    }
    let written = collector.save(TOPIC, "appstore", &rows).await?;
    report.record(written, rows.len());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::super::http::testing::CannedFetcher;
    use super::*;

    const PAGE: &str = r#"{"feed": {"entry": [
        {"im:name": {"label": "Replika"}, "id": {"label": "app"}},
        {"id": {"label": "r1"}, "title": {"label": "Addicted"}, "content": {"label": "I can't stop talking to her"},
         "im:rating": {"label": "2"}, "im:voteCount": {"label": "14"}, "author": {"name": {"label": "sam"}}},
        {"id": {"label": "r2"}, "title": {"label": "Nice"}, "content": {"label": "My companion is sweet"},
         "im:rating": {"label": "5"}, "im:voteCount": {"label": "0"}, "author": {"name": {"label": ""}}},
        {"id": {"label": "r3"}, "title": {"label": "Ok app"}, "content": {"label": "works fine"},
         "im:rating": {"label": "4"}}
    ]}}"#;

    #[test]
    fn test_first_entry_is_skipped() {
        let resp: FeedResponse = serde_json::from_str(PAGE).unwrap();
        let reviews = resp.feed.entry.reviews();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].id.label, "r1");
    }

    #[test]
    fn test_single_entry_page_has_no_reviews() {
        let resp: FeedResponse = serde_json::from_str(r#"{"feed": {"entry": {"id": {"label": "app"}}}}"#).unwrap();
        assert!(resp.feed.entry.reviews().is_empty());
        let resp: FeedResponse = serde_json::from_str(r#"{"feed": {}}"#).unwrap();
        assert!(resp.feed.entry.reviews().is_empty());
    }

    #[test]
    fn test_build_rows() {
        let resp: FeedResponse = serde_json::from_str(PAGE).unwrap();
        let rows = build_rows("Replika", "1158555867", resp.feed.entry.reviews(), "2025-02-01");
        let cats: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["LEVEL_3_CRISIS", "LEVEL_2_DEPENDENT", "LEVEL_1_CASUAL"]);
        assert_eq!(rows[0].likes, 14);
        assert_eq!(rows[1].author, "Anonymous");
        assert_eq!(rows[2].likes, 0);
    }

    #[tokio::test]
    async fn test_run_only_for_ai_topic() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CannedFetcher::default().with("page=1/", PAGE);
        let c = Collector::new(fetcher, dir.path()).with_delay(std::time::Duration::ZERO);

        let report = run(&c, &["healthcare".into()]).await.unwrap();
        assert!(report.files.is_empty());

        let report = run(&c, &["ai_psychosis".into()]).await.unwrap();
        assert_eq!(report.files.len(), 1);
        // three reviews per app, page 2 is a 404 for every app
        assert_eq!(report.rows, 3 * APPS.len());
    }
}
