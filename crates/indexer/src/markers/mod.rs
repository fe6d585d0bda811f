//! Freshness markers written next to the index after a successful import.
//!
//! - `.inpx-updated`: Unix timestamp (seconds) of when the catalog was last
//!   current. Taken from the `version.info` entry inside the archive, or the
//!   archive file's own modification time when that is unavailable.
//! - `.inpx-version`: the collection version string, when the archive has one.
//!
//! Both are overwritten on every successful import and never read back here.

mod error;

pub use self::error::{Error, ErrorKind, Result};

use exn::ResultExt;
use inpxer_inpx::version_info_modified;
use std::path::Path;
use time::OffsetDateTime;
use tracing::instrument;

pub const UPDATED_MARKER: &str = ".inpx-updated";
pub const VERSION_MARKER: &str = ".inpx-version";

/// When the catalog in `archive_path` was last current, in Unix seconds.
pub async fn archive_timestamp(archive_path: &Path) -> Result<i64> {
    match version_info_modified(archive_path) {
        Ok(modified) => return Ok(modified.unix_timestamp()),
        Err(err) => tracing::debug!(error = %err, "Falling back to archive modification time"),
    }
    let metadata = tokio::fs::metadata(archive_path).await.or_raise(|| ErrorKind::Timestamp)?;
    let modified = metadata.modified().or_raise(|| ErrorKind::Timestamp)?;
    Ok(OffsetDateTime::from(modified).unix_timestamp())
}

/// Write `.inpx-updated` under `index_path` and return the timestamp written.
#[instrument(skip_all, fields(index = %index_path.display()))]
pub async fn write_updated(index_path: &Path, archive_path: &Path) -> Result<i64> {
    let timestamp = archive_timestamp(archive_path).await?;
    write(index_path, UPDATED_MARKER, timestamp.to_string()).await?;
    Ok(timestamp)
}

/// Write `.inpx-version` under `index_path`. An empty version writes nothing
/// and returns `false`.
#[instrument(skip_all, fields(index = %index_path.display()))]
pub async fn write_version(index_path: &Path, version: &str) -> Result<bool> {
    if version.is_empty() {
        return Ok(false);
    }
    write(index_path, VERSION_MARKER, version.to_string()).await?;
    Ok(true)
}

async fn write(index_path: &Path, marker: &'static str, content: String) -> Result<()> {
    tokio::fs::create_dir_all(index_path).await.or_raise(|| ErrorKind::Write(marker))?;
    tokio::fs::write(index_path.join(marker), content).await.or_raise(|| ErrorKind::Write(marker))?;
    tracing::trace!(marker, "Marker written");
    Ok(())
}
