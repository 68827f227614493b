//! JSON output: the `scores.json` summary and `official_scores.json`.
//!
//! Both files are pretty-printed so that weekly diffs stay readable.

use crate::error::Result;
use crate::models::MetricScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
#[instrument(level = "info", skip(value), fields(path = %path.display()))]
pub async fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON file");
    Ok(())
}

/// Summary written by `score --json-out`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoresReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: Vec<MetricScore>,
}

pub async fn write_scores(scores: &[MetricScore], path: &Path) -> Result<()> {
    let report = ScoresReport {
        generated_at: Utc::now(),
        metrics: scores.to_vec(),
    };
    write_json(&report, path).await
}
