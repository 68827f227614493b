//! Dashboard publisher: rewrites numbers inside `metricDetailData.ts`.
//!
//! The front-end keeps one object literal per topic, keyed by the topic's
//! display name:
//!
//! ```text
//! "Housing Despair": {
//!     title: "Housing Despair",
//!     score: 72.34,
//!     label: "...",
//!     trend: "worsening",
//!     officialScore: 37.6,
//!     crisisRatio: 60.2,
//!     levelDistribution: { level1: 10, level2: 20, level3: 30, total: 60 },
//!     lastUpdated: "March 1, 2025",
//!     collectionProgress: [{ platform: "YouTube", current: 100, ... }],
//!     dataSources: ["YouTube: 100 videos", "Reddit: 50 posts"],
//! }
//! ```
//!
//! Each field is located with a regex anchored at `title: "<name>"` and only
//! the numeric (or quoted) value is replaced, so hand-written text around it
//! survives. Per-source counts of zero leave the existing value alone.

use crate::error::Result;
use crate::models::{MetricScore, Source};
use chrono::{Local, NaiveDate};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Score change (either way) that counts as a real movement.
pub const TREND_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Worsening,
    Improving,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Worsening => "worsening",
            Trend::Improving => "improving",
            Trend::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a score change. A topic with no previous score is
/// reported as worsening.
pub fn calculate_trend(old_score: Option<f64>, new_score: f64) -> Trend {
    let Some(old) = old_score else {
        return Trend::Worsening;
    };
    let diff = new_score - old;
    if diff > TREND_THRESHOLD {
        Trend::Worsening
    } else if diff < -TREND_THRESHOLD {
        Trend::Improving
    } else {
        Trend::Neutral
    }
}

/// Scores currently in the file, keyed by topic name.
pub fn read_current_scores<'a, I>(content: &str, names: I) -> Result<HashMap<String, f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scores = HashMap::new();
    for name in names {
        let re = Regex::new(&format!(r#"title: "{}",\s*score: ([\d.]+)"#, regex::escape(name)))?;
        if let Some(score) = re
            .captures(content)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            scores.insert(name.to_string(), score);
        }
    }
    Ok(scores)
}

/// Replace what follows capture group 1 (up to group 2, if present) with `value`.
fn replace_field(content: &str, pattern: &str, value: &str) -> Result<String> {
    let re = Regex::new(pattern)?;
    let out = re.replace_all(content, |caps: &Captures| {
        let suffix = caps.get(2).map_or("", |m| m.as_str());
        format!("{}{}{}", &caps[1], value, suffix)
    });
    Ok(out.into_owned())
}

/// `dataSources` entry and unit for each source that has one.
fn data_source_unit(source: Source) -> Option<&'static str> {
    match source {
        Source::YouTube | Source::TikTok => Some("videos"),
        Source::Reddit | Source::Bluesky => Some("posts"),
        Source::HackerNews => Some("stories"),
        Source::Cfpb => Some("complaints"),
        Source::AppStore => None,
    }
}

/// Byte range of the topic's own object literal, from `"<name>": {` up to
/// the next top-level key or the closing `};`.
pub fn topic_block(content: &str, name: &str) -> Result<Option<Range<usize>>> {
    let key = format!("\"{name}\": {{");
    let Some(start) = content.find(&key) else {
        return Ok(None);
    };
    let body_start = start + key.len();
    let boundary = Regex::new(r#"(?m)^(?:  "[^"\n]+": \{|\};)"#)?;
    let end = boundary
        .find(&content[body_start..])
        .map_or(content.len(), |m| body_start + m.start());
    Ok(Some(start..end))
}

/// Rewrite every field of one topic. Returns the new content; other topics'
/// objects are never touched, and a topic without an object is left as is.
pub fn update_metric(content: &str, score: &MetricScore, trend: Trend, today: NaiveDate) -> Result<String> {
    let Some(range) = topic_block(content, &score.name)? else {
        return Ok(content.to_string());
    };
    let block = update_block(&content[range.clone()], score, trend, today)?;
    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..range.start]);
    out.push_str(&block);
    out.push_str(&content[range.end..]);
    Ok(out)
}

fn update_block(content: &str, score: &MetricScore, trend: Trend, today: NaiveDate) -> Result<String> {
    let name = regex::escape(&score.name);
    let title = format!(r#"title: "{name}""#);
    let mut out = content.to_string();

    out = replace_field(
        &out,
        &format!(r#"("{name}": \{{\s*{title},\s*score: )[\d.]+"#),
        &score.final_score.to_string(),
    )?;
    out = replace_field(
        &out,
        &format!(
            r#"({title},\s*score: [\d.]+,\s*label: "[^"]+",\s*trend: "[^"]+",\s*officialScore: [\d.]+,\s*crisisRatio: )[\d.]+"#
        ),
        &score.social.to_string(),
    )?;
    out = replace_field(
        &out,
        &format!(r#"({title},\s*score: [\d.]+,\s*label: "[^"]+",\s*trend: )"[^"]+""#),
        &format!("\"{trend}\""),
    )?;

    out = replace_field(
        &out,
        &format!(r"(?s)({title}.*?levelDistribution: \{{\s*level1: )\d+"),
        &score.levels.level1.to_string(),
    )?;
    for (field, value) in [
        ("level2", score.levels.level2),
        ("level3", score.levels.level3),
        ("total", score.total),
    ] {
        out = replace_field(
            &out,
            &format!(r"(?s)({title}.*?levelDistribution: \{{[^}}]*{field}: )\d+"),
            &value.to_string(),
        )?;
    }

    out = replace_field(
        &out,
        &format!(r#"(?s)({title}.*?lastUpdated: ")[^"]+"#),
        &today.format("%B %-d, %Y").to_string(),
    )?;

    for source in [Source::YouTube, Source::Reddit, Source::TikTok] {
        let count = score.count_for(source);
        if count == 0 {
            continue;
        }
        let platform = source.label();
        out = replace_field(
            &out,
            &format!(r#"(?s)({title}.*?platform: "{platform}",\s*current: )\d+"#),
            &count.to_string(),
        )?;
    }

    let tiktok = score.count_for(Source::TikTok);
    if tiktok > 0 {
        let re = Regex::new(&format!(
            r#"(?s)({title}.*?platform: "TikTok",\s*current: \d+,\s*target: )(\d+)(,\s*percentage: )\d+"#
        ))?;
        out = re
            .replace_all(&out, |caps: &Captures| {
                let target: usize = caps[2].parse().unwrap_or(0);
                let pct = if target == 0 { 100 } else { (tiktok * 100 / target).min(100) };
                format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], pct)
            })
            .into_owned();
    }

    for source in [
        Source::YouTube,
        Source::Reddit,
        Source::TikTok,
        Source::HackerNews,
        Source::Cfpb,
        Source::Bluesky,
    ] {
        let count = score.count_for(source);
        let Some(unit) = data_source_unit(source) else {
            continue;
        };
        if count == 0 {
            continue;
        }
        let label = source.label();
        out = replace_field(
            &out,
            &format!(r#"(?s)({title}.*?dataSources:.*?"{label}: )\d+( {unit})"#),
            &count.to_string(),
        )?;
    }

    Ok(out)
}

/// Outcome of one publish run.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub updated: Vec<(String, Trend)>,
    /// Topics whose name was not found in the file.
    pub missing: Vec<String>,
}

/// Apply all scores to `content`.
pub fn apply_scores(content: &str, scores: &[MetricScore], today: NaiveDate) -> Result<(String, PublishReport)> {
    let previous = read_current_scores(content, scores.iter().map(|s| s.name.as_str()))?;
    let mut report = PublishReport {
        updated: Vec::new(),
        missing: Vec::new(),
    };
    let mut out = content.to_string();

    for score in scores {
        if topic_block(&out, &score.name)?.is_none() {
            warn!(name = %score.name, "Topic not present in dashboard file");
            report.missing.push(score.name.clone());
            continue;
        }
        let old = previous.get(&score.name).copied();
        let trend = calculate_trend(old, score.final_score);
        info!(name = %score.name, old = ?old, new = score.final_score, %trend, "Updating topic");
        out = update_metric(&out, score, trend, today)?;
        report.updated.push((score.name.clone(), trend));
    }

    Ok((out, report))
}

/// Rewrite `ts_file` in place with `scores`.
#[instrument(level = "info", skip(scores), fields(path = %ts_file.display(), topics = scores.len()))]
pub async fn publish_scores(ts_file: &Path, scores: &[MetricScore]) -> Result<PublishReport> {
    let content = fs::read_to_string(ts_file).await?;
    let (updated, report) = apply_scores(&content, scores, Local::now().date_naive())?;
    fs::write(ts_file, updated).await?;
    info!(updated = report.updated.len(), missing = report.missing.len(), "Published scores");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LevelCounts, OfficialSource};
    use std::collections::BTreeMap;

    const FIXTURE: &str = r#"export const metricDetailData = {
  "Housing Despair": {
    title: "Housing Despair",
    score: 60.5,
    label: "Critical",
    trend: "neutral",
    officialScore: 37.6,
    crisisRatio: 75.1,
    levelDistribution: {
      level1: 10,
      level2: 20,
      level3: 30,
      total: 60,
    },
    lastUpdated: "January 5, 2025",
    collectionProgress: [
      { platform: "YouTube", current: 100, target: 150, percentage: 66 },
      { platform: "Reddit", current: 50, target: 100, percentage: 50 },
      { platform: "TikTok", current: 20, target: 120, percentage: 16 },
    ],
    dataSources: ["YouTube: 100 videos", "Reddit: 50 posts", "TikTok: 20 videos", "Hacker News: 5 stories", "CFPB: 7 complaints", "Bluesky: 9 posts"],
  },
  "What Healthcare?": {
    title: "What Healthcare?",
    score: 50,
    label: "Severe",
    trend: "worsening",
    officialScore: 36.17,
    crisisRatio: 40,
    levelDistribution: {
      level1: 1,
      level2: 1,
      level3: 1,
      total: 3,
    },
    lastUpdated: "January 5, 2025",
    collectionProgress: [
      { platform: "YouTube", current: 3, target: 150, percentage: 2 },
    ],
    dataSources: ["YouTube: 3 videos"],
  },
};
"#;

    fn score(name: &str, final_score: f64, social: f64, counts: &[(Source, usize)], levels: LevelCounts) -> MetricScore {
        let source_counts: BTreeMap<Source, usize> = counts.iter().copied().collect();
        MetricScore {
            name: name.into(),
            slug: String::new(),
            official: 0.0,
            official_source: OfficialSource::Config,
            social,
            final_score,
            total: source_counts.values().sum(),
            levels,
            source_counts,
            files: vec![],
        }
    }

    fn housing() -> MetricScore {
        score(
            "Housing Despair",
            75.04,
            100.0,
            &[(Source::YouTube, 2), (Source::Reddit, 2), (Source::TikTok, 1)],
            LevelCounts { level1: 0, level2: 0, level3: 5 },
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn test_calculate_trend() {
        assert_eq!(calculate_trend(None, 10.0), Trend::Worsening);
        assert_eq!(calculate_trend(Some(50.0), 52.5), Trend::Worsening);
        assert_eq!(calculate_trend(Some(50.0), 47.5), Trend::Improving);
        assert_eq!(calculate_trend(Some(50.0), 52.0), Trend::Neutral);
        assert_eq!(calculate_trend(Some(50.0), 48.0), Trend::Neutral);
    }

    #[test]
    fn test_read_current_scores() {
        let scores = read_current_scores(FIXTURE, ["Housing Despair", "What Healthcare?", "Nope"]).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["Housing Despair"], 60.5);
        assert_eq!(scores["What Healthcare?"], 50.0);
    }

    #[test]
    fn test_update_rewrites_fields() {
        let (out, report) = apply_scores(FIXTURE, &[housing()], today()).unwrap();
        assert_eq!(report.updated, vec![("Housing Despair".to_string(), Trend::Worsening)]);

        assert!(out.contains("score: 75.04,"));
        assert!(out.contains("crisisRatio: 100,"));
        assert!(out.contains(r#"trend: "worsening""#));
        assert!(out.contains("level1: 0,\n      level2: 0,\n      level3: 5,\n      total: 5,"));
        assert!(out.contains(r#"lastUpdated: "March 7, 2025""#));
        assert!(out.contains(r#"{ platform: "YouTube", current: 2, target: 150, percentage: 66 }"#));
        assert!(out.contains(r#"{ platform: "TikTok", current: 1, target: 120, percentage: 0 }"#));
        assert!(out.contains(r#""YouTube: 2 videos", "Reddit: 2 posts", "TikTok: 1 videos""#));
    }

    #[test]
    fn test_zero_counts_leave_text_untouched() {
        let (out, _) = apply_scores(FIXTURE, &[housing()], today()).unwrap();
        assert!(out.contains(r#""Hacker News: 5 stories", "CFPB: 7 complaints", "Bluesky: 9 posts""#));
    }

    #[test]
    fn test_other_topics_are_not_touched() {
        let (out, _) = apply_scores(FIXTURE, &[housing()], today()).unwrap();
        let healthcare = &out[out.find("\"What Healthcare?\": {").unwrap()..];
        assert!(healthcare.contains("score: 50,"));
        assert!(healthcare.contains("level1: 1,"));
        assert!(healthcare.contains(r#"lastUpdated: "January 5, 2025""#));
        assert!(healthcare.contains(r#""YouTube: 3 videos""#));
    }

    #[test]
    fn test_names_with_regex_metacharacters() {
        let s = score(
            "What Healthcare?",
            51.0,
            60.0,
            &[(Source::YouTube, 40)],
            LevelCounts { level1: 20, level2: 10, level3: 10 },
        );
        let (out, report) = apply_scores(FIXTURE, &[s], today()).unwrap();
        assert_eq!(report.updated[0].1, Trend::Neutral);
        let healthcare = &out[out.find("\"What Healthcare?\": {").unwrap()..];
        assert!(healthcare.contains("score: 51,"));
        assert!(healthcare.contains("total: 40,"));
        assert!(healthcare.contains(r#""YouTube: 40 videos""#));
    }

    #[test]
    fn test_missing_topic_is_reported() {
        let s = score("Layoff Watch", 10.0, 10.0, &[], LevelCounts::default());
        let (out, report) = apply_scores(FIXTURE, &[s], today()).unwrap();
        assert_eq!(out, FIXTURE);
        assert_eq!(report.missing, vec!["Layoff Watch".to_string()]);
    }

    const NEIGHBOURS: &str = r#"export const metricDetails = {
  "Subscription Overload": {
    title: "Subscription Overload",
    score: 40,
    label: "Moderate",
    trend: "neutral",
    officialScore: 30,
    crisisRatio: 45,
    levelDistribution: {
      level1: 4,
      level2: 2,
      level3: 1,
      total: 7,
    },
    lastUpdated: "January 5, 2025",
    collectionProgress: [
      { platform: "Industry Reports", current: 3, target: 5, percentage: 60 },
    ],
    dataSources: ["Industry Reports", "Social Media Sampling"],
  },
  "Wage Stagnation": {
    title: "Wage Stagnation",
    score: 55,
    label: "Severe",
    trend: "neutral",
    officialScore: 50,
    crisisRatio: 58,
    levelDistribution: {
      level1: 10,
      level2: 10,
      level3: 10,
      total: 30,
    },
    lastUpdated: "January 5, 2025",
    collectionProgress: [
      { platform: "YouTube", current: 40, target: 150, percentage: 26 },
      { platform: "TikTok", current: 12, target: 120, percentage: 10 },
    ],
    dataSources: ["YouTube: 40 videos with wage content", "TikTok: 12 videos with wage hashtags"],
  },
};
"#;

    #[test]
    fn test_topic_without_platform_entries_leaves_next_topic_alone() {
        let s = score(
            "Subscription Overload",
            42.0,
            50.0,
            &[(Source::YouTube, 9), (Source::TikTok, 7)],
            LevelCounts { level1: 10, level2: 5, level3: 1 },
        );
        let (out, report) = apply_scores(NEIGHBOURS, &[s], today()).unwrap();
        assert_eq!(report.updated.len(), 1);

        let split = out.find("\"Wage Stagnation\": {").unwrap();
        let (subscription, wage) = out.split_at(split);
        assert!(subscription.contains("score: 42,"));
        assert!(subscription.contains("total: 16,"));
        assert!(subscription.contains(r#"dataSources: ["Industry Reports", "Social Media Sampling"]"#));

        assert!(wage.contains("score: 55,"));
        assert!(wage.contains(r#"{ platform: "YouTube", current: 40, target: 150, percentage: 26 }"#));
        assert!(wage.contains(r#"{ platform: "TikTok", current: 12, target: 120, percentage: 10 }"#));
        assert!(wage.contains(r#""TikTok: 12 videos with wage hashtags""#));
        assert!(wage.contains(r#"lastUpdated: "January 5, 2025""#));
    }

    #[test]
    fn test_topic_block_bounds() {
        let range = topic_block(NEIGHBOURS, "Wage Stagnation").unwrap().unwrap();
        let block = &NEIGHBOURS[range];
        assert!(block.starts_with("\"Wage Stagnation\": {"));
        assert!(!block.contains("};"));
        let range = topic_block(NEIGHBOURS, "Subscription Overload").unwrap().unwrap();
        assert!(!NEIGHBOURS[range].contains("Wage Stagnation"));
        assert!(topic_block(NEIGHBOURS, "Layoff Watch").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_publish_scores_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metricDetailData.ts");
        std::fs::write(&path, FIXTURE).unwrap();

        let report = publish_scores(&path, &[housing()]).await.unwrap();
        assert_eq!(report.updated.len(), 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("score: 75.04,"));
    }
}
