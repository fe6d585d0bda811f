//! Builders for INPX archives, for use in tests.
//!
//! Enabled by the `fixture` feature so that other crates can build archives in
//! their own tests without depending on `zip` directly.

use crate::consts::{COLLECTION_INFO, FIELD_SEPARATOR, STRUCTURE_INFO, VERSION_INFO};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use time::OffsetDateTime;
use zip::write::{FullFileOptions, SimpleFileOptions};
use zip::{DateTime, ZipWriter};

const EXTENDED_TIMESTAMP: u16 = 0x5455;

/// Render a listing line in the default field layout.
///
/// Only the identifier, title and deleted flag vary; everything else is filled
/// with plausible values.
pub fn record_line(lib_id: u64, title: &str, deleted: bool) -> String {
    let separator = FIELD_SEPARATOR.to_string();
    let id = lib_id.to_string();
    [
        "Doe,John,:",
        "prose_contemporary:",
        title,
        "",
        "",
        id.as_str(),
        "1024",
        id.as_str(),
        if deleted { "1" } else { "0" },
        "fb2",
        "2020-01-31",
        "en",
        "",
        "",
        "",
    ]
    .join(separator.as_str())
}

/// Incrementally describes the entries of an INPX archive.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    collection_info: Option<String>,
    version: Option<String>,
    version_modified: Option<i64>,
    version_extended: Option<u32>,
    structure: Option<String>,
    listings: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection_info(mut self, text: impl Into<String>) -> Self {
        self.collection_info = Some(text.into());
        self
    }

    /// Add a `version.info` entry with the given contents.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Stamp the `version.info` entry with a Unix timestamp (even seconds only;
    /// zip timestamps have a two second resolution).
    pub fn version_modified_at(mut self, timestamp: i64) -> Self {
        self.version_modified = Some(timestamp);
        self
    }

    /// Attach an extended timestamp field (0x5455) with the given modification
    /// time to the `version.info` entry.
    pub fn version_extended_time(mut self, timestamp: u32) -> Self {
        self.version_extended = Some(timestamp);
        self
    }

    pub fn structure(mut self, structure: impl Into<String>) -> Self {
        self.structure = Some(structure.into());
        self
    }

    /// Add a listing whose lines are joined with CRLF, as real archives do.
    pub fn listing(mut self, name: impl Into<String>, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let content = lines
            .into_iter()
            .map(|line| {
                let line: String = line.into();
                line + "\r\n"
            })
            .collect::<String>();
        self.listings.push((name.into(), content.into_bytes()));
        self
    }

    /// Add an entry with exactly the given contents.
    pub fn raw_listing(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.listings.push((name.into(), content.into()));
        self
    }

    /// Write the archive to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = SimpleFileOptions::default();
        if let Some(info) = &self.collection_info {
            zip.start_file(COLLECTION_INFO, options)?;
            zip.write_all(info.as_bytes())?;
        }
        if let Some(version) = &self.version {
            let mut version_options = FullFileOptions::default();
            if let Some(timestamp) = self.version_modified {
                version_options = version_options.last_modified_time(zip_datetime(timestamp)?);
            }
            if let Some(timestamp) = self.version_extended {
                // Flags (modification time present) followed by the time itself.
                let mut data = vec![0x01];
                data.extend_from_slice(&timestamp.to_le_bytes());
                version_options.add_extra_data(EXTENDED_TIMESTAMP, data.into_boxed_slice(), false)?;
            }
            zip.start_file(VERSION_INFO, version_options)?;
            zip.write_all(version.as_bytes())?;
        }
        if let Some(structure) = &self.structure {
            zip.start_file(STRUCTURE_INFO, options)?;
            zip.write_all(structure.as_bytes())?;
        }
        for (name, content) in &self.listings {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
        Ok(())
    }
}

fn zip_datetime(timestamp: i64) -> io::Result<DateTime> {
    let at = OffsetDateTime::from_unix_timestamp(timestamp).map_err(io::Error::other)?;
    let year = u16::try_from(at.year()).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "negative year"))?;
    DateTime::from_date_and_time(year, u8::from(at.month()), at.day(), at.hour(), at.minute(), at.second())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "timestamp outside zip range"))
}
