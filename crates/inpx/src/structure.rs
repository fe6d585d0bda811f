//! Listing field layout and line parsing.

use crate::consts::{
    BOOK_ARCHIVE_EXTENSION, DEFAULT_STRUCTURE, FIELD_SEPARATOR, KEYWORD_SEPARATOR, LIST_SEPARATOR,
    STRUCTURE_SEPARATOR,
};
use crate::error::{ErrorKind, Result};
use crate::models::{Author, RawRecord};
use exn::{OptionExt, ResultExt};
use time::Date;
use time::macros::format_description;

/// A column of an `.inp` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Author,
    Genre,
    Title,
    Series,
    SerNo,
    File,
    Size,
    LibId,
    Del,
    Ext,
    Date,
    Lang,
    LibRate,
    Keywords,
    Folder,
    /// Columns this reader does not interpret (`INSNO`, `URI`, ...).
    Other,
}
impl Field {
    fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "AUTHOR" => Self::Author,
            "GENRE" => Self::Genre,
            "TITLE" => Self::Title,
            "SERIES" => Self::Series,
            "SERNO" => Self::SerNo,
            "FILE" => Self::File,
            "SIZE" => Self::Size,
            "LIBID" => Self::LibId,
            "DEL" => Self::Del,
            "EXT" => Self::Ext,
            "DATE" => Self::Date,
            "LANG" => Self::Lang,
            "LIBRATE" => Self::LibRate,
            "KEYWORDS" => Self::Keywords,
            "FOLDER" => Self::Folder,
            _ => Self::Other,
        }
    }
}

/// Field order of the listings in one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    fields: Vec<Field>,
}
impl Default for Structure {
    fn default() -> Self {
        Self::parse(DEFAULT_STRUCTURE)
    }
}
impl Structure {
    /// Parse the contents of `structure.info` (`AUTHOR;GENRE;TITLE;...;`).
    ///
    /// Falls back to the default layout when the text names no fields at all.
    pub fn parse(text: &str) -> Self {
        let fields: Vec<Field> = text
            .lines()
            .next()
            .unwrap_or_default()
            .split(STRUCTURE_SEPARATOR)
            .filter(|name| !name.trim().is_empty())
            .map(Field::from_name)
            .collect();
        if fields.is_empty() {
            return Self::default();
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Parse one listing line into a record.
    ///
    /// `listing` is the name of the `.inp` entry the line came from; it
    /// provides the folder when the layout has no `FOLDER` column (or it is
    /// empty).
    pub fn parse_line(&self, line: &str, listing: &str) -> Result<RawRecord> {
        let mut record = RawRecord::default();
        let mut lib_id = None;
        for (field, value) in self.fields.iter().zip(line.split(FIELD_SEPARATOR)) {
            let value = value.trim();
            match field {
                Field::Author => {
                    record.authors =
                        split_list(value, LIST_SEPARATOR).map(Author::parse).filter(|a| !a.is_empty()).collect()
                },
                Field::Genre => record.genres = split_list(value, LIST_SEPARATOR).map(String::from).collect(),
                Field::Title => record.title = value.to_string(),
                Field::Series => record.series = value.to_string(),
                Field::SerNo => record.series_no = lenient("SERNO", value),
                Field::File => record.file = value.to_string(),
                Field::Size => record.size = strict("SIZE", value)?.unwrap_or(0),
                Field::LibId => lib_id = strict("LIBID", value)?,
                Field::Del => record.deleted = value == "1",
                Field::Ext => record.ext = value.to_string(),
                Field::Date => record.date = parse_date(value),
                Field::Lang => record.language = value.to_string(),
                Field::LibRate => record.rating = lenient("LIBRATE", value),
                Field::Keywords => {
                    record.keywords = split_list(value, KEYWORD_SEPARATOR).map(String::from).collect()
                },
                Field::Folder => record.folder = value.to_string(),
                Field::Other => {},
            }
        }
        record.lib_id = lib_id.ok_or_raise(|| ErrorKind::ParseError {
            field: "LIBID",
            value: String::new(),
        })?;
        if record.folder.is_empty() {
            record.folder = default_folder(listing);
        }
        Ok(record)
    }
}

fn split_list(value: &str, separator: char) -> impl Iterator<Item = &str> {
    value.split(separator).map(str::trim).filter(|v| !v.is_empty())
}

/// Empty values are absent; anything else must parse.
fn strict<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<T>().map(Some).or_raise(|| ErrorKind::ParseError { field, value: value.to_string() })
}

/// Malformed values are treated as absent.
fn lenient<T: std::str::FromStr>(field: &'static str, value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    let parsed = value.parse::<T>().ok();
    if parsed.is_none() {
        tracing::debug!(field, value, "Ignoring malformed optional field");
    }
    parsed
}

fn parse_date(value: &str) -> Option<Date> {
    if value.is_empty() {
        return None;
    }
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

/// `fb2-000001-000100.inp` lists the books stored in `fb2-000001-000100.zip`.
fn default_folder(listing: &str) -> String {
    let name = listing.rsplit(['/', '\\']).next().unwrap_or(listing);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    format!("{stem}.{BOOK_ARCHIVE_EXTENSION}")
}
