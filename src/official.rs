//! Official scores: FRED statistics normalized to the 0-100 absurdity scale.
//!
//! Four topics have a FRED mapping; every other topic keeps the fallback
//! `official_score` from the configuration. The result is written to
//! `official_scores.json`, and only entries whose source is `"fred"`
//! override the configured value when scoring.
//!
//! | Topic | Input | Curve anchors |
//! |-------|-------|---------------|
//! | wage_stagnation | real wage growth (YoY %) | 4%+ = 0, 2% = 20, 0% = 50, -3% = 100 |
//! | housing_despair | price-to-income ratio | 3x = 20, 5x = 50, 7x = 80, 9x+ = 100 |
//! | layoff_watch | weekly initial claims | 200k = 20, 250k = 50, 400k = 90, 600k+ = 100 |
//! | healthcare | consumer sentiment | 100 - sentiment |

use crate::config::Config;
use crate::error::Result;
use crate::outputs::json::write_json;
use crate::scoring::round_to;
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

pub const OFFICIAL_SCORES_FILE: &str = "official_scores.json";

pub const SOURCE_FRED: &str = "fred";
pub const SOURCE_FALLBACK: &str = "config_fallback";
pub const SOURCE_FRED_FAILED: &str = "config_fallback (fred failed)";

pub const AVG_HOURLY_EARNINGS: &str = "CES0500000003";
pub const CPI: &str = "CPIAUCSL";
pub const MEDIAN_HOME_PRICE: &str = "MSPUS";
pub const MEDIAN_HOUSEHOLD_INCOME: &str = "MEHOINUSA672N";
pub const INITIAL_CLAIMS: &str = "ICSA";
pub const CONSUMER_SENTIMENT: &str = "UMCSENT";

/// Series fetched for a run, keyed by a readable name.
pub const SERIES: [(&str, &str); 6] = [
    ("avg_hourly_earnings", AVG_HOURLY_EARNINGS),
    ("cpi", CPI),
    ("median_home_price", MEDIAN_HOME_PRICE),
    ("median_household_income", MEDIAN_HOUSEHOLD_INCOME),
    ("initial_claims", INITIAL_CLAIMS),
    ("consumer_sentiment", CONSUMER_SENTIMENT),
];

/// Topics with a FRED-derived score.
pub const FRED_TOPICS: [&str; 4] = ["wage_stagnation", "housing_despair", "layoff_watch", "healthcare"];

/// One dated value of a FRED series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Observations per series ID, sorted by date ascending.
pub type FredData = HashMap<String, Vec<Observation>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialEntry {
    pub score: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialScores {
    pub generated_at: String,
    pub fred_series_used: BTreeMap<String, String>,
    pub scores: BTreeMap<String, OfficialEntry>,
}

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Real wage growth (percentage points) to score.
pub fn wage_stagnation_score(real_growth: f64) -> f64 {
    let score = if real_growth >= 2.0 {
        clamp(20.0 - (real_growth - 2.0) * 10.0, 0.0, 20.0)
    } else if real_growth >= 0.0 {
        50.0 - (real_growth / 2.0) * 30.0
    } else {
        clamp(50.0 + real_growth.abs() * (50.0 / 3.0), 50.0, 100.0)
    };
    round_to(clamp(score, 0.0, 100.0), 1)
}

/// Median home price divided by median household income, to score.
pub fn housing_despair_score(ratio: f64) -> f64 {
    let score = if ratio <= 3.0 {
        clamp(ratio / 3.0 * 20.0, 0.0, 20.0)
    } else if ratio <= 5.0 {
        20.0 + (ratio - 3.0) / 2.0 * 30.0
    } else if ratio <= 7.0 {
        50.0 + (ratio - 5.0) / 2.0 * 30.0
    } else {
        clamp(80.0 + (ratio - 7.0) / 2.0 * 20.0, 80.0, 100.0)
    };
    round_to(clamp(score, 0.0, 100.0), 1)
}

/// Weekly initial jobless claims (absolute count) to score.
pub fn layoff_watch_score(claims: f64) -> f64 {
    let k = claims / 1000.0;
    let score = if k <= 200.0 {
        clamp(k / 200.0 * 20.0, 0.0, 20.0)
    } else if k <= 250.0 {
        20.0 + (k - 200.0) / 50.0 * 30.0
    } else if k <= 400.0 {
        50.0 + (k - 250.0) / 150.0 * 40.0
    } else {
        clamp(90.0 + (k - 400.0) / 200.0 * 10.0, 90.0, 100.0)
    };
    round_to(clamp(score, 0.0, 100.0), 1)
}

/// Consumer sentiment, inverted.
pub fn healthcare_score(sentiment: f64) -> f64 {
    round_to(clamp(100.0 - sentiment, 0.0, 100.0), 1)
}

/// Year-over-year percent change of the latest observation.
///
/// The prior value is the observation whose date is closest to 365 days
/// before the latest one. `None` with fewer than two observations or a zero
/// prior.
pub fn pct_change_yoy(observations: &[Observation]) -> Option<f64> {
    if observations.len() < 2 {
        return None;
    }
    let latest = observations.last()?;
    let target = latest.date - chrono::Duration::days(365);
    let prior = observations
        .iter()
        .min_by_key(|o| (o.date - target).num_days().abs())?;
    if prior.value == 0.0 {
        return None;
    }
    Some((latest.value - prior.value) / prior.value * 100.0)
}

fn latest_value(data: &FredData, series: &str) -> Option<f64> {
    data.get(series).and_then(|obs| obs.last()).map(|o| o.value)
}

/// FRED-derived score for `slug`, or `None` when the inputs are missing or
/// unusable.
pub fn fred_score(slug: &str, data: &FredData) -> Option<f64> {
    match slug {
        "wage_stagnation" => {
            let wages = pct_change_yoy(data.get(AVG_HOURLY_EARNINGS)?)?;
            let prices = pct_change_yoy(data.get(CPI)?)?;
            let real = wages - prices;
            debug!(wages, prices, real, "Real wage growth");
            Some(wage_stagnation_score(real))
        }
        "housing_despair" => {
            let price = latest_value(data, MEDIAN_HOME_PRICE)?;
            let income = latest_value(data, MEDIAN_HOUSEHOLD_INCOME)?;
            if income == 0.0 {
                return None;
            }
            Some(housing_despair_score(price / income))
        }
        "layoff_watch" => latest_value(data, INITIAL_CLAIMS).map(layoff_watch_score),
        "healthcare" => latest_value(data, CONSUMER_SENTIMENT).map(healthcare_score),
        _ => None,
    }
}

/// Official score for every configured topic, FRED first, config second.
pub fn build_official_scores(config: &Config, data: &FredData) -> OfficialScores {
    let mut scores = BTreeMap::new();
    for metric in &config.metrics {
        let slug = metric.slug.as_str();
        let entry = if FRED_TOPICS.contains(&slug) {
            match fred_score(slug, data) {
                Some(score) => OfficialEntry {
                    score,
                    source: SOURCE_FRED.into(),
                },
                None => {
                    warn!(slug, fallback = metric.official_score, "FRED score unavailable; using fallback");
                    OfficialEntry {
                        score: metric.official_score,
                        source: SOURCE_FRED_FAILED.into(),
                    }
                }
            }
        } else {
            OfficialEntry {
                score: metric.official_score,
                source: SOURCE_FALLBACK.into(),
            }
        };
        scores.insert(metric.slug.clone(), entry);
    }

    OfficialScores {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        fred_series_used: SERIES
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect(),
        scores,
    }
}

pub async fn write_official_scores(scores: &OfficialScores, data_dir: &Path) -> Result<()> {
    let from_fred = scores.scores.values().filter(|e| e.source == SOURCE_FRED).count();
    info!(from_fred, total = scores.scores.len(), "Writing official scores");
    write_json(scores, &data_dir.join(OFFICIAL_SCORES_FILE)).await
}

/// FRED-sourced scores from `official_scores.json`, keyed by slug.
///
/// A missing or unreadable file yields an empty map; fallback entries are
/// ignored so the configured value applies.
#[instrument(level = "debug", fields(dir = %data_dir.display()))]
pub fn load_fred_scores(data_dir: &Path) -> HashMap<String, f64> {
    let path = data_dir.join(OFFICIAL_SCORES_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "No official scores file");
            return HashMap::new();
        }
    };
    match serde_json::from_str::<OfficialScores>(&raw) {
        Ok(file) => file
            .scores
            .into_iter()
            .filter(|(_, e)| e.source == SOURCE_FRED)
            .map(|(slug, e)| (slug, e.score))
            .collect(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not parse official scores");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: f64) -> Observation {
        Observation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            value,
        }
    }

    #[test]
    fn test_wage_curve() {
        assert_eq!(wage_stagnation_score(5.0), 0.0);
        assert_eq!(wage_stagnation_score(2.0), 20.0);
        assert_eq!(wage_stagnation_score(1.0), 35.0);
        assert_eq!(wage_stagnation_score(0.0), 50.0);
        assert_eq!(wage_stagnation_score(-1.5), 75.0);
        assert_eq!(wage_stagnation_score(-10.0), 100.0);
    }

    #[test]
    fn test_housing_curve() {
        assert_eq!(housing_despair_score(1.5), 10.0);
        assert_eq!(housing_despair_score(3.0), 20.0);
        assert_eq!(housing_despair_score(4.0), 35.0);
        assert_eq!(housing_despair_score(6.0), 65.0);
        assert_eq!(housing_despair_score(8.0), 90.0);
        assert_eq!(housing_despair_score(20.0), 100.0);
    }

    #[test]
    fn test_layoff_curve() {
        assert_eq!(layoff_watch_score(100_000.0), 10.0);
        assert_eq!(layoff_watch_score(225_000.0), 35.0);
        assert_eq!(layoff_watch_score(325_000.0), 70.0);
        assert_eq!(layoff_watch_score(500_000.0), 95.0);
        assert_eq!(layoff_watch_score(2_000_000.0), 100.0);
    }

    #[test]
    fn test_healthcare_curve_clamps() {
        assert_eq!(healthcare_score(57.3), 42.7);
        assert_eq!(healthcare_score(120.0), 0.0);
        assert_eq!(healthcare_score(-5.0), 100.0);
    }

    #[test]
    fn test_pct_change_yoy_uses_closest_prior() {
        let series = vec![
            obs("2023-12-01", 90.0),
            obs("2024-01-01", 100.0),
            obs("2024-06-01", 104.0),
            obs("2025-01-01", 110.0),
        ];
        let change = pct_change_yoy(&series).unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pct_change_yoy_edge_cases() {
        assert_eq!(pct_change_yoy(&[obs("2025-01-01", 1.0)]), None);
        assert_eq!(pct_change_yoy(&[obs("2024-01-01", 0.0), obs("2025-01-01", 5.0)]), None);
    }

    #[test]
    fn test_build_official_scores_sources() {
        let mut data = FredData::new();
        data.insert(INITIAL_CLAIMS.into(), vec![obs("2025-02-01", 225_000.0)]);
        data.insert(CONSUMER_SENTIMENT.into(), vec![obs("2025-01-01", 70.0)]);

        let scores = build_official_scores(&Config::default(), &data);
        assert_eq!(scores.scores.len(), 8);
        assert_eq!(scores.scores["layoff_watch"], OfficialEntry { score: 35.0, source: "fred".into() });
        assert_eq!(scores.scores["healthcare"].score, 30.0);
        assert_eq!(scores.scores["housing_despair"].source, SOURCE_FRED_FAILED);
        assert_eq!(scores.scores["housing_despair"].score, 37.6);
        assert_eq!(scores.scores["airline_chaos"].source, SOURCE_FALLBACK);
        assert_eq!(scores.fred_series_used["cpi"], "CPIAUCSL");
    }

    #[tokio::test]
    async fn test_only_fred_entries_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = FredData::new();
        data.insert(INITIAL_CLAIMS.into(), vec![obs("2025-02-01", 100_000.0)]);
        let scores = build_official_scores(&Config::default(), &data);
        write_official_scores(&scores, dir.path()).await.unwrap();

        let loaded = load_fred_scores(dir.path());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["layoff_watch"], 10.0);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_fred_scores(dir.path()).is_empty());
    }
}
