use super::Author;
use time::Date;

/// A single catalog record as it appears in an `.inp` listing.
///
/// Only `lib_id` and `deleted` carry meaning for ingestion; every other field
/// is passed through to the normalizer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Library identifier, unique per book within one archive.
    pub lib_id: u64,
    /// The library has withdrawn the book.
    pub deleted: bool,
    pub authors: Vec<Author>,
    pub genres: Vec<String>,
    pub title: String,
    pub series: String,
    pub series_no: Option<u32>,
    /// File name of the book inside its folder, without extension.
    pub file: String,
    /// Size of the book file in bytes.
    pub size: u64,
    /// File extension (`fb2`, `epub`, ...).
    pub ext: String,
    /// Date the book was added to the library.
    pub date: Option<Date>,
    pub language: String,
    pub rating: Option<u8>,
    pub keywords: Vec<String>,
    /// Inner archive holding the book file.
    pub folder: String,
}
