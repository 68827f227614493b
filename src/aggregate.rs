//! Per-topic score aggregation.
//!
//! For each topic: take the newest usable snapshot of every source, pool the
//! rows, compute the engagement-weighted social score, and blend it with the
//! official score (FRED when available, otherwise the configured fallback).

use crate::config::{Config, MetricConfig};
use crate::discovery::{find_metric_files, read_snapshot, tiktok_rows};
use crate::error::Result;
use crate::models::{MetricScore, OfficialSource, Row, Source};
use crate::scoring::{calculate_score_from_rows, round_to};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, instrument, warn};

#[instrument(level = "info", skip(config, fred_scores), fields(slug = %metric.slug, dir = %dir.display()))]
pub fn calculate_metric_score(
    dir: &Path,
    metric: &MetricConfig,
    config: &Config,
    fred_scores: &HashMap<String, f64>,
    min_rows: usize,
) -> Result<MetricScore> {
    let mut rows: Vec<Row> = Vec::new();
    let mut source_counts = BTreeMap::new();
    let mut files = Vec::new();

    for found in find_metric_files(dir, metric, min_rows)? {
        match read_snapshot(&found.path) {
            Ok(snapshot) => {
                info!(source = %found.source, path = %found.path.display(), rows = snapshot.rows.len(), "Using snapshot");
                source_counts.insert(found.source, snapshot.rows.len());
                files.push(found.path);
                rows.extend(snapshot.rows);
            }
            Err(e) => warn!(source = %found.source, path = %found.path.display(), error = %e, "Skipping unreadable snapshot"),
        }
    }

    if let Some((path, tiktok)) = tiktok_rows(dir, &metric.slug, min_rows)?.filter(|(_, r)| !r.is_empty()) {
        info!(source = %Source::TikTok, path = %path.display(), rows = tiktok.len(), "Using TikTok rows");
        source_counts.insert(Source::TikTok, tiktok.len());
        files.push(path);
        rows.extend(tiktok);
    }

    let (social, levels) = calculate_score_from_rows(&rows, config);

    let (official, official_source) = match fred_scores.get(&metric.slug) {
        Some(score) => (*score, OfficialSource::Fred),
        None => (metric.official_score, OfficialSource::Config),
    };
    let final_score = config.formula.blend(official, social);

    info!(
        rows = rows.len(),
        official,
        official_source = ?official_source,
        social = round_to(social, 2),
        score = round_to(final_score, 2),
        "Scored topic"
    );

    Ok(MetricScore {
        name: metric.name.clone(),
        slug: metric.slug.clone(),
        official,
        official_source,
        social: round_to(social, 2),
        final_score: round_to(final_score, 2),
        total: rows.len(),
        levels,
        source_counts,
        files,
    })
}

/// Score every configured topic. Topics with no data at all are skipped.
pub fn calculate_all(
    dir: &Path,
    config: &Config,
    fred_scores: &HashMap<String, f64>,
    min_rows: usize,
) -> Result<Vec<MetricScore>> {
    let mut scores = Vec::new();
    for metric in &config.metrics {
        let score = calculate_metric_score(dir, metric, config, fred_scores, min_rows)?;
        if score.total == 0 {
            warn!(slug = %metric.slug, "No data found; topic not scored");
            continue;
        }
        scores.push(score);
    }
    Ok(scores)
}
