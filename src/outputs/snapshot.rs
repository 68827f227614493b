//! CSV snapshot writer.
//!
//! Collectors hand over a slice of serde rows; the header comes from the
//! row struct's field order. A collection with zero rows writes nothing, so
//! the previous snapshot stays the newest one on disk.

use crate::discovery::Snapshot;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

fn encode_rows<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Write `rows` to `dir/file_name`. Returns `None` (and writes nothing) when
/// `rows` is empty.
#[instrument(level = "info", skip(rows), fields(dir = %dir.display(), rows = rows.len()))]
pub async fn write_snapshot<T: Serialize>(
    dir: &Path,
    file_name: &str,
    rows: &[T],
) -> Result<Option<PathBuf>> {
    if rows.is_empty() {
        warn!(file_name, "No rows collected; keeping previous snapshot");
        return Ok(None);
    }

    let bytes = encode_rows(rows)?;
    fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), rows = rows.len(), "Wrote CSV snapshot");
    Ok(Some(path))
}

/// Rewrite a snapshot in place, keeping its original column order.
pub async fn rewrite_snapshot(snapshot: &Snapshot) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&snapshot.headers)?;
    for row in &snapshot.rows {
        writer.write_record(
            snapshot
                .headers
                .iter()
                .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
        )?;
    }
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    fs::write(&snapshot.path, bytes).await?;
    Ok(())
}
