//! FRED series observations, turned into official scores.

use super::Collector;
use super::http::FetchAsync;
use crate::config::Config;
use crate::error::Result;
use crate::official::{FredData, Observation, OfficialScores, SERIES, build_official_scores, write_official_scores};
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

pub const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
/// History fetched per series; year-over-year changes need at least 13 months.
pub const HISTORY_DAYS: i64 = 3 * 365;

#[derive(Debug, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}

/// Values are strings; `"."` marks a missing observation.
#[derive(Debug, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

pub fn observations_url(series_id: &str, api_key: &str, start: NaiveDate) -> Result<Url> {
    Ok(Url::parse_with_params(
        OBSERVATIONS_URL,
        &[
            ("series_id", series_id),
            ("api_key", api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("observation_start", start.format("%Y-%m-%d").to_string().as_str()),
        ],
    )?)
}

/// Parsed observations, sorted by date. Missing and malformed values are dropped.
pub fn parse_observations(raw: Vec<RawObservation>) -> Vec<Observation> {
    let mut parsed: Vec<Observation> = raw
        .into_iter()
        .filter_map(|o| {
            let date = NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").ok()?;
            let value = o.value.trim().parse::<f64>().ok()?;
            Some(Observation { date, value })
        })
        .collect();
    parsed.sort_by_key(|o| o.date);
    parsed
}

/// Every series in [`SERIES`]; series that fail to load are left out.
#[instrument(level = "info", skip_all)]
pub async fn fetch_series<F: FetchAsync>(collector: &Collector<F>, api_key: &str) -> Result<FredData> {
    let start = Local::now().date_naive() - Duration::days(HISTORY_DAYS);
    let mut data = FredData::new();
    for (name, id) in SERIES {
        let url = observations_url(id, api_key, start)?;
        match collector.get_json::<ObservationsResponse>(&url).await {
            Some(resp) => {
                let observations = parse_observations(resp.observations);
                info!(series = name, id, observations = observations.len(), "Fetched FRED series");
                data.insert(id.to_string(), observations);
            }
            None => warn!(series = name, id, "FRED series unavailable"),
        }
    }
    Ok(data)
}

/// Fetch, score and write `official_scores.json` into the collector's data dir.
pub async fn collect_official<F: FetchAsync>(collector: &Collector<F>, api_key: &str, config: &Config) -> Result<OfficialScores> {
    let data = fetch_series(collector, api_key).await?;
    let scores = build_official_scores(config, &data);
    write_official_scores(&scores, collector.data_dir()).await?;
    Ok(scores)
}
