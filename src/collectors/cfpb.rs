//! CFPB consumer complaints (no key needed), 90-day window.
//!
//! Complaints carry no engagement figure, so every row weighs the same
//! (zero) when scoring and only the level counts matter.

use super::http::FetchAsync;
use super::{CollectReport, Collector};
use crate::categorize::presets;
use crate::error::Result;
use crate::utils::snippet;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

pub const API_BASE: &str = "https://www.consumerfinance.gov/data-research/consumer-complaints/search/api/v1/";
pub const LOOKBACK_DAYS: i64 = 90;
pub const MAX_RESULTS: u32 = 100;
const SNIPPET_CHARS: usize = 200;

/// One filtered search against the complaints API.
#[derive(Debug, Clone, Copy)]
pub struct ComplaintQuery {
    pub label: &'static str,
    pub params: &'static [(&'static str, &'static str)],
}

/// Queries per topic; topics not listed have no CFPB counterpart.
pub fn queries_for(slug: &str) -> &'static [ComplaintQuery] {
    match slug {
        "healthcare" => &[
            ComplaintQuery {
                label: "Medical debt collection",
                params: &[("product", "Debt collection"), ("sub_product", "Medical debt")],
            },
            ComplaintQuery {
                label: "Health care / medical debt",
                params: &[("product", "Debt collection"), ("sub_product", "Health care medical")],
            },
        ],
        "housing_despair" => &[
            ComplaintQuery {
                label: "Mortgage complaints",
                params: &[("product", "Mortgage")],
            },
            ComplaintQuery {
                label: "Credit reporting - mortgage issues",
                params: &[
                    (
                        "product",
                        "Credit reporting, credit repair services, or other personal consumer reports",
                    ),
                    ("issue", "mortgage"),
                ],
            },
        ],
        "subscription_overload" => &[ComplaintQuery {
            label: "Credit card billing disputes",
            params: &[("product", "Credit card or prepaid card"), ("issue", "billing")],
        }],
        _ => &[],
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,
    #[serde(rename = "_source", default)]
    pub source: Complaint,
}

#[derive(Debug, Default, Deserialize)]
pub struct Complaint {
    pub complaint_id: Option<Value>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub sub_product: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub complaint_what_happened: Option<String>,
    #[serde(default)]
    pub date_received: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintRow {
    pub complaint_id: String,
    pub product: String,
    pub sub_product: String,
    pub issue: String,
    pub category: String,
    pub date_received: String,
    pub narrative_snippet: String,
    pub metric: String,
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn search_url(query: &ComplaintQuery, today: NaiveDate) -> Result<Url> {
    let start = today - Duration::days(LOOKBACK_DAYS);
    let mut url = Url::parse(API_BASE)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("date_received_min", &start.format("%Y-%m-%d").to_string())
            .append_pair("date_received_max", &today.format("%Y-%m-%d").to_string())
            .append_pair("size", &MAX_RESULTS.to_string())
            .append_pair("sort", "created_date_desc")
            .append_pair("no_aggs", "true")
            .append_pair("field", "all");
        for (k, v) in query.params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Rows for one response. Complaint IDs are deduped across a topic's queries.
pub fn build_rows(slug: &str, hits: Vec<Hit>, seen: &mut HashSet<String>) -> Vec<ComplaintRow> {
    let mut rows = Vec::new();
    for hit in hits {
        let c = hit.source;
        let id = c
            .complaint_id
            .as_ref()
            .or(hit.id.as_ref())
            .map(id_string)
            .unwrap_or_default();
        if !seen.insert(id.clone()) {
            continue;
        }

        let product = c.product.unwrap_or_default();
        let sub_product = c.sub_product.unwrap_or_default();
        let issue = c.issue.unwrap_or_default();
        let narrative = c.complaint_what_happened.unwrap_or_default();

        let text = [narrative.as_str(), &product, &issue, &sub_product]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let Some(category) = presets::CFPB.categorize(&text) else {
            continue;
        };

        rows.push(ComplaintRow {
            complaint_id: id,
            product,
            sub_product,
            issue,
            category: category.to_string(),
            date_received: c.date_received.unwrap_or_default(),
            narrative_snippet: snippet(&narrative, SNIPPET_CHARS),
            metric: slug.to_string(),
        });
    }
    rows
}

#[instrument(level = "info", skip(collector))]
pub async fn collect_topic<F: FetchAsync>(collector: &Collector<F>, slug: &str) -> Result<Vec<ComplaintRow>> {
    let today = Local::now().date_naive();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for query in queries_for(slug) {
        let url = search_url(query, today)?;
        let Some(resp) = collector.get_json::<SearchResponse>(&url).await else {
            continue;
        };
        let found = build_rows(slug, resp.hits.hits, &mut seen);
        debug!(query = query.label, new = found.len(), "Queried CFPB");
        rows.extend(found);
    }
    Ok(rows)
}

pub async fn run<F: FetchAsync>(collector: &Collector<F>, slugs: &[String]) -> Result<CollectReport> {
    let mut report = CollectReport::default();
    for slug in slugs {
        if queries_for(slug).is_empty() {
            debug!(slug = %slug, "No CFPB queries for topic");
            continue;
        }
        let rows = collect_topic(collector, slug).await?;
        info!(slug = %slug, rows = rows.len(), "CFPB collection done");
        let written = collector.save(slug, "cfpb", &rows).await?;
        report.record(written, rows.len());
    }
    Ok(report)
}
