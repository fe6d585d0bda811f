use crate::collection::Archive;
use crate::consts::VERSION_INFO;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use time::{Date, Month, PrimitiveDateTime, Time, UtcDateTime};
use tracing::instrument;
use zip::ZipArchive;
use zip::extra_fields::ExtraField;
use zip::result::ZipError;

/// Modification time of the `version.info` entry inside the archive at `path`.
///
/// The archive is opened as a plain zip container, independently of any
/// [`Collection`](crate::Collection) that may already be reading it. An
/// extended timestamp field on the entry wins over the DOS time, which carries
/// no zone and is taken as UTC.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn version_info_modified(path: impl AsRef<Path>) -> Result<UtcDateTime> {
    let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Io)?;
    let mut archive: Archive = ZipArchive::new(BufReader::new(file)).or_raise(|| ErrorKind::InvalidArchive)?;
    let entry = match archive.by_name(VERSION_INFO) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::MissingEntry(VERSION_INFO)),
        Err(err) => return Err(err).or_raise(|| ErrorKind::InvalidArchive),
    };
    // The extended timestamp field carries the real UTC time; the DOS time
    // is local to whoever built the archive.
    let extended = entry.extra_data_fields().find_map(|field| match field {
        ExtraField::ExtendedTimestamp(timestamp) => timestamp.mod_time(),
        _ => None,
    });
    if let Some(seconds) = extended {
        return UtcDateTime::from_unix_timestamp(i64::from(seconds)).or_raise(|| ErrorKind::NoTimestamp(VERSION_INFO));
    }
    let modified = entry.last_modified().ok_or_raise(|| ErrorKind::NoTimestamp(VERSION_INFO))?;
    to_utc(&modified)
}

fn to_utc(modified: &zip::DateTime) -> Result<UtcDateTime> {
    let invalid = || ErrorKind::NoTimestamp(VERSION_INFO);
    let month = Month::try_from(modified.month()).or_raise(invalid)?;
    let date = Date::from_calendar_date(i32::from(modified.year()), month, modified.day()).or_raise(invalid)?;
    let time = Time::from_hms(modified.hour(), modified.minute(), modified.second()).or_raise(invalid)?;
    Ok(PrimitiveDateTime::new(date, time).as_utc())
}
