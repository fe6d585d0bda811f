use inpxer_inpx::RawRecord;
use time::Date;

/// A catalog book as stored in the index.
///
/// Produced from a [`RawRecord`] by the normalizer (the [`From`] impl below).
/// The library identifier is the key: within one archive it is unique after
/// deduplication, and across partial imports it decides which row a book
/// replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub lib_id: u64,
    pub title: String,
    /// Display names in reading order ("First Middle Last").
    pub authors: Vec<String>,
    pub genres: Vec<String>,
    pub series: Option<Series>,
    pub file: BookFile,
    /// Lower-cased language code as given by the library.
    pub language: Option<String>,
    pub added_on: Option<Date>,
    pub rating: Option<u8>,
    pub keywords: Vec<String>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Series {
    pub name: String,
    pub number: Option<u32>,
}

/// Location of the book file inside the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookFile {
    /// File name without extension.
    pub name: String,
    pub ext: String,
    pub size: u64,
    /// Inner archive holding the file.
    pub folder: String,
}
impl BookFile {
    /// File name including its extension, as found inside the folder.
    pub fn file_name(&self) -> String {
        if self.ext.is_empty() { self.name.clone() } else { format!("{}.{}", self.name, self.ext) }
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl From<RawRecord> for Book {
    fn from(record: RawRecord) -> Self {
        let authors = record.authors.iter().map(ToString::to_string).filter(|name| !name.is_empty()).collect();
        let series = non_empty(record.series).map(|name| Series { name, number: record.series_no });
        Self {
            lib_id: record.lib_id,
            title: record.title.trim().to_string(),
            authors,
            genres: record.genres,
            series,
            file: BookFile {
                name: record.file,
                ext: record.ext.trim().to_lowercase(),
                size: record.size,
                folder: record.folder,
            },
            language: non_empty(record.language).map(|l| l.to_lowercase()),
            added_on: record.date,
            rating: record.rating,
            keywords: record.keywords,
            deleted: record.deleted,
        }
    }
}
