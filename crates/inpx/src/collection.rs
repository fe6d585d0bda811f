//! Lazy, single-pass access to the records of an INPX archive.

use crate::consts::{COLLECTION_INFO, LISTING_EXTENSION, STRUCTURE_INFO, VERSION_INFO};
use crate::error::{Error, ErrorKind, Result};
use crate::models::{CollectionInfo, RawRecord};
use crate::structure::Structure;
use exn::ResultExt;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::instrument;
use zip::ZipArchive;
use zip::result::ZipError;

pub(crate) type Archive = ZipArchive<BufReader<File>>;

/// An opened INPX archive.
///
/// Records are produced by [`stream`](Self::stream). The sequence is finite
/// and cannot be restarted: once a listing has been consumed it is gone, and
/// calling `stream` again only yields whatever was left. Failures while
/// reading are not reported per item; the sequence ends early and the failure
/// is available from [`take_error`](Self::take_error) afterwards.
pub struct Collection {
    path: PathBuf,
    archive: Archive,
    info: CollectionInfo,
    version: String,
    structure: Structure,
    listings: VecDeque<String>,
    error: Option<Error>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("version", &self.version)
            .field("listings", &self.listings.len())
            .finish_non_exhaustive()
    }
}

impl Collection {
    /// Open the archive at `path` and read its descriptive entries.
    ///
    /// `collection.info`, `version.info` and `structure.info` are all
    /// optional. Fails if the file cannot be read or is not a zip container.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).or_raise(|| ErrorKind::Io)?;
        let mut archive = ZipArchive::new(BufReader::new(file)).or_raise(|| ErrorKind::InvalidArchive)?;

        let info = read_text(&mut archive, COLLECTION_INFO)?.map(|t| CollectionInfo::parse(&t)).unwrap_or_default();
        let version = read_text(&mut archive, VERSION_INFO)?
            .map(|t| t.lines().next().unwrap_or_default().trim().to_string())
            .unwrap_or_default();
        let structure = read_text(&mut archive, STRUCTURE_INFO)?.map(|t| Structure::parse(&t)).unwrap_or_default();
        let listings: VecDeque<String> = archive.file_names().filter(|name| is_listing(name)).map(String::from).collect();

        tracing::debug!(
            name = %info.name,
            version = %version,
            listings = listings.len(),
            "Opened collection"
        );
        Ok(Self {
            path,
            archive,
            info,
            version,
            structure,
            listings,
            error: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &CollectionInfo {
        &self.info
    }

    /// Collection version string from `version.info`; empty when absent.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Lazily produce the records of every listing, in archive order.
    pub fn stream(&mut self) -> Records<'_> {
        Records {
            archive: &mut self.archive,
            structure: &self.structure,
            listings: &mut self.listings,
            error: &mut self.error,
            current: None,
        }
    }

    /// The failure that ended the record sequence early, if any.
    ///
    /// Only meaningful once the sequence from [`stream`](Self::stream) has
    /// been drained.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Release the underlying archive.
    pub fn close(self) {
        tracing::trace!(path = %self.path.display(), "Closing collection");
    }
}

/// Iterator over the records of a [`Collection`].
pub struct Records<'a> {
    archive: &'a mut Archive,
    structure: &'a Structure,
    listings: &'a mut VecDeque<String>,
    error: &'a mut Option<Error>,
    current: Option<Listing>,
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.error.is_some() {
                return None;
            }
            let Some(listing) = self.current.as_mut() else {
                let name = self.listings.pop_front()?;
                match Listing::load(self.archive, name) {
                    Ok(listing) => self.current = Some(listing),
                    Err(err) => *self.error = Some(err),
                }
                continue;
            };
            let Some((number, range)) = listing.next_line() else {
                self.current = None;
                continue;
            };
            let line = &listing.content[range];
            if line.trim().is_empty() {
                continue;
            }
            match self.structure.parse_line(line, &listing.name) {
                Ok(record) => return Some(record),
                Err(err) => {
                    let entry = listing.name.clone();
                    tracing::debug!(entry = %entry, line = number, "Malformed record; ending stream");
                    *self.error = Some(err.raise(ErrorKind::Record { entry, line: number }));
                },
            }
        }
    }
}

/// A fully buffered `.inp` listing and a cursor over its lines.
struct Listing {
    name: String,
    content: String,
    offset: usize,
    line: usize,
}
impl Listing {
    fn load(archive: &mut Archive, name: String) -> Result<Self> {
        tracing::debug!(entry = %name, "Reading listing");
        let bytes = read_entry(archive, &name)?.ok_or_else(|| exn::Exn::from(ErrorKind::InvalidArchive))?;
        // Listings are UTF-8 in practice; don't give up on a whole listing
        // over a single mangled byte.
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(
                    entry = %name,
                    offset = err.utf8_error().valid_up_to(),
                    "Listing is not valid UTF-8; replacing invalid bytes"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            },
        };
        Ok(Self { name, content, offset: 0, line: 0 })
    }

    /// Returns the one-based line number and byte range of the next line,
    /// excluding the line terminator.
    fn next_line(&mut self) -> Option<(usize, Range<usize>)> {
        if self.offset >= self.content.len() {
            return None;
        }
        let start = self.offset;
        let end = self.content[start..].find('\n').map_or(self.content.len(), |i| start + i);
        self.offset = end + 1;
        self.line += 1;
        let trimmed = if self.content[start..end].ends_with('\r') { end - 1 } else { end };
        Some((self.line, start..trimmed))
    }
}

fn is_listing(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LISTING_EXTENSION))
}

/// Read a whole entry; `None` when the archive has no entry by that name.
pub(crate) fn read_entry(archive: &mut Archive, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err).or_raise(|| ErrorKind::InvalidArchive),
    };
    let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
    entry.read_to_end(&mut buffer).or_raise(|| ErrorKind::Io)?;
    Ok(Some(buffer))
}

fn read_text(archive: &mut Archive, name: &str) -> Result<Option<String>> {
    Ok(read_entry(archive, name)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}
