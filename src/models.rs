//! Data models shared by collectors, the aggregator and the publisher.
//!
//! - [`Category`]: severity label assigned to one collected item
//! - [`Source`]: where a CSV snapshot came from
//! - [`Row`]: one CSV record keyed by column name (schemas differ per source)
//! - [`LevelCounts`] and [`MetricScore`]: aggregation output

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// One CSV record, keyed by header name.
pub type Row = HashMap<String, String>;

/// Severity label written into the `category` column.
///
/// The level-1 and level-2 buckets carry different names depending on the
/// source that produced them; all variants of a level share a default weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "LEVEL_1_AWARE")]
    Level1Aware,
    #[serde(rename = "LEVEL_1_CASUAL")]
    Level1Casual,
    #[serde(rename = "LEVEL_2_FRUSTRATED")]
    Level2Frustrated,
    #[serde(rename = "LEVEL_2_STRUGGLING")]
    Level2Struggling,
    #[serde(rename = "LEVEL_2_DEPENDENT")]
    Level2Dependent,
    #[serde(rename = "LEVEL_3_CRISIS")]
    Level3Crisis,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Level1Aware,
        Category::Level1Casual,
        Category::Level2Frustrated,
        Category::Level2Struggling,
        Category::Level2Dependent,
        Category::Level3Crisis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Level1Aware => "LEVEL_1_AWARE",
            Category::Level1Casual => "LEVEL_1_CASUAL",
            Category::Level2Frustrated => "LEVEL_2_FRUSTRATED",
            Category::Level2Struggling => "LEVEL_2_STRUGGLING",
            Category::Level2Dependent => "LEVEL_2_DEPENDENT",
            Category::Level3Crisis => "LEVEL_3_CRISIS",
        }
    }

    /// Ordinal severity, 1 through 3.
    pub fn level(&self) -> u8 {
        match self {
            Category::Level1Aware | Category::Level1Casual => 1,
            Category::Level2Frustrated | Category::Level2Struggling | Category::Level2Dependent => 2,
            Category::Level3Crisis => 3,
        }
    }

    /// Weight used when the config does not override it.
    pub fn default_weight(&self) -> f64 {
        match self.level() {
            1 => 0.33,
            2 => 0.66,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a CSV snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    YouTube,
    Reddit,
    HackerNews,
    Cfpb,
    Bluesky,
    AppStore,
    TikTok,
}

impl Source {
    /// Per-topic sources probed by the aggregator, in probe order.
    pub const PER_TOPIC: [Source; 6] = [
        Source::YouTube,
        Source::Reddit,
        Source::HackerNews,
        Source::Cfpb,
        Source::Bluesky,
        Source::AppStore,
    ];

    /// Token used in snapshot file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Source::YouTube => "youtube",
            Source::Reddit => "reddit",
            Source::HackerNews => "hackernews",
            Source::Cfpb => "cfpb",
            Source::Bluesky => "bluesky",
            Source::AppStore => "appstore",
            Source::TikTok => "tiktok",
        }
    }

    /// Human-readable name, as used in the dashboard's `dataSources` strings.
    pub fn label(&self) -> &'static str {
        match self {
            Source::YouTube => "YouTube",
            Source::Reddit => "Reddit",
            Source::HackerNews => "Hacker News",
            Source::Cfpb => "CFPB",
            Source::Bluesky => "Bluesky",
            Source::AppStore => "App Store",
            Source::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row counts per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub level1: usize,
    pub level2: usize,
    pub level3: usize,
}

impl LevelCounts {
    /// Count a raw `category` value. Anything that is not a level label is ignored.
    pub fn record(&mut self, category: &str) {
        if category.contains("LEVEL_1") {
            self.level1 += 1;
        } else if category.contains("LEVEL_2") {
            self.level2 += 1;
        } else if category.contains("LEVEL_3") {
            self.level3 += 1;
        }
    }
}

/// Where a topic's official score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficialSource {
    Fred,
    Config,
}

/// Aggregated score for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricScore {
    pub name: String,
    pub slug: String,
    pub official: f64,
    pub official_source: OfficialSource,
    /// Engagement-weighted severity on a 0-100 scale (the "crisis ratio").
    pub social: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
    pub total: usize,
    pub levels: LevelCounts,
    pub source_counts: BTreeMap<Source, usize>,
    pub files: Vec<PathBuf>,
}

impl MetricScore {
    pub fn count_for(&self, source: Source) -> usize {
        self.source_counts.get(&source).copied().unwrap_or(0)
    }

    /// Labels of sources that contributed at least one row.
    pub fn sources(&self) -> Vec<&'static str> {
        self.source_counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(s, _)| s.label())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Level2Struggling).unwrap();
        assert_eq!(json, "\"LEVEL_2_STRUGGLING\"");
    }

    #[test]
    fn test_category_levels_and_weights() {
        assert_eq!(Category::Level1Casual.level(), 1);
        assert_eq!(Category::Level2Dependent.level(), 2);
        assert_eq!(Category::Level3Crisis.level(), 3);
        assert_eq!(Category::Level1Aware.default_weight(), 0.33);
        assert_eq!(Category::Level3Crisis.default_weight(), 1.0);
    }

    #[test]
    fn test_level_counts_record() {
        let mut counts = LevelCounts::default();
        for c in ["LEVEL_1_AWARE", "LEVEL_2_FRUSTRATED", "LEVEL_3_CRISIS", "LEVEL_3_CRISIS", "garbage", ""] {
            counts.record(c);
        }
        assert_eq!(counts, LevelCounts { level1: 1, level2: 1, level3: 2 });
    }

    #[test]
    fn test_metric_score_sources_skip_empty() {
        let mut source_counts = BTreeMap::new();
        source_counts.insert(Source::YouTube, 10);
        source_counts.insert(Source::Reddit, 0);
        source_counts.insert(Source::TikTok, 3);
        let score = MetricScore {
            name: "Housing Despair".into(),
            slug: "housing_despair".into(),
            official: 37.6,
            official_source: OfficialSource::Config,
            social: 50.0,
            final_score: 45.04,
            total: 13,
            levels: LevelCounts::default(),
            source_counts,
            files: vec![],
        };
        assert_eq!(score.sources(), vec!["YouTube", "TikTok"]);
        assert_eq!(score.count_for(Source::Reddit), 0);
        assert_eq!(score.count_for(Source::Cfpb), 0);
    }
}
