//! Engagement-weighted severity scoring.
//!
//! Each row contributes `log10(engagement + 1)` as its weight; the social
//! score is the weighted mean of severity weights scaled to 0-100.

use crate::config::Config;
use crate::models::{LevelCounts, Row};

/// Engagement columns, in lookup order. Sources use different names.
pub const ENGAGEMENT_FIELDS: [&str; 6] = ["view_count", "views", "score", "points", "like_count", "likes"];

/// First strictly positive engagement value in the row, else 0.
///
/// Values that do not parse as integers are skipped.
pub fn engagement_value(row: &Row) -> u64 {
    ENGAGEMENT_FIELDS
        .iter()
        .filter_map(|field| row.get(*field))
        .filter_map(|raw| parse_count(raw))
        .find(|v| *v > 0)
        .unwrap_or(0)
}

/// Counts are sometimes written as floats ("1200.0") by other tooling.
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
}

pub fn engagement_weight(value: u64) -> f64 {
    ((value as f64) + 1.0).log10()
}

/// Social score and level distribution over `rows`.
///
/// Returns 0 when the summed engagement weight is 0 (no rows, or every row
/// has zero engagement). Level counts always include every row.
pub fn calculate_score_from_rows<'a, I>(rows: I, config: &Config) -> (f64, LevelCounts)
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut weighted = 0.0;
    let mut total_engagement = 0.0;
    let mut levels = LevelCounts::default();

    for row in rows {
        let category = row.get("category").map(String::as_str).unwrap_or("");
        levels.record(category);

        let severity = config.severity_weight(category);
        let engagement = engagement_weight(engagement_value(row));
        weighted += severity * engagement;
        total_engagement += engagement;
    }

    if total_engagement == 0.0 {
        return (0.0, levels);
    }
    (weighted / total_engagement * 100.0, levels)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
