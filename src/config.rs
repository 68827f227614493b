//! Topic configuration, severity weights and the blend formula.
//!
//! The configuration is read from `config.json` or `config.yaml` (chosen by
//! file extension). When no file is given the built-in topics are used.
//!
//! ```json
//! {
//!   "metrics": [
//!     { "name": "Housing Despair", "slug": "housing_despair", "official_score": 37.6 }
//!   ],
//!   "severity_weights": { "LEVEL_3_CRISIS": 1.0 },
//!   "formula": { "official_weight": 0.4, "social_weight": 0.6 }
//! }
//! ```

use crate::categorize::presets;
use crate::error::{Error, Result};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Weight applied to categories missing from the weight table.
pub const UNKNOWN_CATEGORY_WEIGHT: f64 = 0.33;

/// One absurdity dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Display name; also the key of the topic in `metricDetailData.ts`.
    pub name: String,
    pub slug: String,
    /// Fallback official score used when FRED has nothing for this topic.
    pub official_score: f64,
    /// Overrides `{slug}_youtube_*.csv`.
    #[serde(default)]
    pub youtube_pattern: Option<String>,
    /// Overrides `{slug}_reddit_*.csv`.
    #[serde(default)]
    pub reddit_pattern: Option<String>,
}

impl MetricConfig {
    fn new(name: &str, slug: &str, official_score: f64) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            official_score,
            youtube_pattern: None,
            reddit_pattern: None,
        }
    }

    pub fn youtube_pattern(&self) -> String {
        self.youtube_pattern
            .clone()
            .unwrap_or_else(|| format!("{}_youtube_*.csv", self.slug))
    }

    pub fn reddit_pattern(&self) -> String {
        self.reddit_pattern
            .clone()
            .unwrap_or_else(|| format!("{}_reddit_*.csv", self.slug))
    }
}

/// Split between the official statistic and the social score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    pub official_weight: f64,
    pub social_weight: f64,
}

impl Default for Formula {
    fn default() -> Self {
        Self {
            official_weight: 0.4,
            social_weight: 0.6,
        }
    }
}

impl Formula {
    pub fn blend(&self, official: f64, social: f64) -> f64 {
        official * self.official_weight + social * self.social_weight
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub metrics: Vec<MetricConfig>,
    #[serde(default)]
    pub severity_weights: HashMap<String, f64>,
    #[serde(default)]
    pub formula: Formula,
}

impl Default for Config {
    fn default() -> Self {
        let metrics = vec![
            MetricConfig::new("What Healthcare?", "healthcare", 36.17),
            MetricConfig::new("AI Psychosis", "ai_psychosis", 12.5),
            MetricConfig::new("Subscription Overload", "subscription_overload", 45.2),
            MetricConfig::new("Wage Stagnation", "wage_stagnation", 38.4),
            MetricConfig::new("Housing Despair", "housing_despair", 37.6),
            MetricConfig::new("Airline Chaos", "airline_chaos", 21.0),
            MetricConfig::new("Dating App Despair", "dating_app_despair", 8.5),
            MetricConfig::new("Layoff Watch", "layoff_watch", 76.5),
        ];
        Self {
            metrics,
            severity_weights: default_severity_weights(),
            formula: Formula::default(),
        }
    }
}

fn default_severity_weights() -> HashMap<String, f64> {
    Category::ALL
        .into_iter()
        .map(|c| (c.as_str().to_string(), c.default_weight()))
        .collect()
}

impl Config {
    /// Load a config file, or the built-in defaults when `path` is `None`.
    ///
    /// Weights missing from the file's `severity_weights` fall back to the
    /// per-level defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            debug!("No config file given; using built-in topics");
            return Ok(Config::default());
        };

        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };

        let mut weights = default_severity_weights();
        weights.extend(config.severity_weights.drain());
        config.severity_weights = weights;

        config.validate()?;
        info!(path = %path.display(), metrics = config.metrics.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(Error::Config("no metrics defined".into()));
        }
        for (category, weight) in &self.severity_weights {
            if !(0.0..=1.0).contains(weight) {
                return Err(Error::Config(format!(
                    "severity weight for {category} is {weight}, expected 0..=1"
                )));
            }
        }
        if self.formula.official_weight < 0.0 || self.formula.social_weight < 0.0 {
            return Err(Error::Config("formula weights must be non-negative".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for m in &self.metrics {
            if !seen.insert(m.slug.as_str()) {
                return Err(Error::Config(format!("duplicate metric slug {}", m.slug)));
            }
            if !presets::known_topics().any(|t| t == m.slug) {
                warn!(slug = %m.slug, "No keyword table for topic; collectors will skip it");
            }
        }
        Ok(())
    }

    /// Weight for a raw `category` value; unknown labels weigh 0.33.
    pub fn severity_weight(&self, category: &str) -> f64 {
        self.severity_weights
            .get(category)
            .copied()
            .unwrap_or(UNKNOWN_CATEGORY_WEIGHT)
    }

    pub fn metric(&self, slug: &str) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.metrics.len(), 8);
        assert_eq!(config.metric("healthcare").unwrap().name, "What Healthcare?");
        assert_eq!(config.severity_weight("LEVEL_3_CRISIS"), 1.0);
        assert_eq!(config.severity_weight("LEVEL_2_STRUGGLING"), 0.66);
    }

    #[test]
    fn test_unknown_category_defaults() {
        let config = Config::default();
        assert_eq!(config.severity_weight("NOT_A_LEVEL"), UNKNOWN_CATEGORY_WEIGHT);
        assert_eq!(config.severity_weight(""), UNKNOWN_CATEGORY_WEIGHT);
    }

    #[test]
    fn test_formula_blend() {
        let f = Formula::default();
        assert!((f.blend(50.0, 100.0) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_patterns_default_to_slug() {
        let mut m = MetricConfig::new("Layoff Watch", "layoff_watch", 76.5);
        assert_eq!(m.youtube_pattern(), "layoff_watch_youtube_*.csv");
        m.reddit_pattern = Some("layoffs_reddit_*.csv".into());
        assert_eq!(m.reddit_pattern(), "layoffs_reddit_*.csv");
    }

    #[test]
    fn test_load_json_merges_weights() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "metrics": [{{"name": "Layoff Watch", "slug": "layoff_watch", "official_score": 70}}],
                "severity_weights": {{"LEVEL_3_CRISIS": 0.9}},
                "formula": {{"official_weight": 0.5, "social_weight": 0.5}}
            }}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.metrics.len(), 1);
        assert_eq!(config.severity_weight("LEVEL_3_CRISIS"), 0.9);
        assert_eq!(config.severity_weight("LEVEL_1_AWARE"), 0.33);
        assert_eq!(config.formula.official_weight, 0.5);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "metrics:\n  - name: Airline Chaos\n    slug: airline_chaos\n    official_score: 21.0\n"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.metrics[0].slug, "airline_chaos");
        assert_eq!(config.formula, Formula::default());
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let mut config = Config::default();
        config.severity_weights.insert("LEVEL_3_CRISIS".into(), 1.5);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_slugs() {
        let mut config = Config::default();
        let dup = config.metrics[0].clone();
        config.metrics.push(dup);
        assert!(config.validate().is_err());
    }
}
