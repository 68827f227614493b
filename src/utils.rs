//! Small helpers shared by collectors, scoring and `main`: snapshot file
//! names, text clipping for CSV cells and log lines, and the data-dir probe.

use crate::error::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Format used for the timestamp part of snapshot file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp for a snapshot file name, e.g. `20250301_083000`.
///
/// Because the format is fixed-width and most-significant first, sorting
/// file names lexicographically sorts snapshots chronologically.
pub fn file_timestamp() -> String {
    file_timestamp_at(&Local::now())
}

pub fn file_timestamp_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// Snapshot file name for a topic and source.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     snapshot_name("healthcare", "cfpb", "20250301_083000"),
///     "healthcare_cfpb_20250301_083000.csv"
/// );
/// ```
pub fn snapshot_name(slug: &str, source: &str, timestamp: &str) -> String {
    format!("{slug}_{source}_{timestamp}.csv")
}

/// Collapse whitespace and cut `text` to at most `max` characters.
///
/// An ellipsis (`...`) is appended when the text was cut. Used for
/// `selftext_snippet`, `narrative_snippet` and similar columns.
pub fn snippet(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max).collect();
    format!("{cut}...")
}

/// First `max` chars of `s`, with the number of dropped bytes noted.
///
/// Used to keep undecodable response bodies readable in warnings.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Create the data directory if needed and prove we can write into it.
///
/// Fails early, before any collector spends API quota, when the directory
/// cannot be created or a probe file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let probe = path.join(".absurdity_write_probe");
    stdfs::File::create(&probe)?;
    let _ = stdfs::remove_file(&probe);
    info!("Data directory is writable");
    Ok(())
}
