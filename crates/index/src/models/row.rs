use super::{Book, BookFile, Series};
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use serde_json::{from_str as from_json, to_string as to_json};
use time::{Date, UtcDateTime};

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) lib_id: i64,
    pub(crate) title: String,
    pub(crate) authors: String,
    pub(crate) genres: String,
    pub(crate) series: Option<String>,
    pub(crate) series_no: Option<i64>,
    pub(crate) file_name: String,
    pub(crate) file_ext: String,
    pub(crate) file_size: i64,
    pub(crate) folder: String,
    pub(crate) language: Option<String>,
    pub(crate) added_on: Option<i64>,
    pub(crate) rating: Option<i64>,
    pub(crate) keywords: String,
    pub(crate) deleted: bool,
}

fn date_to_timestamp(date: Date) -> i64 {
    date.midnight().as_utc().unix_timestamp()
}

impl TryFrom<&Book> for BookRow {
    type Error = Error;
    fn try_from(book: &Book) -> Result<Self, Self::Error> {
        Ok(Self {
            lib_id: i64::try_from(book.lib_id).or_raise(|| ErrorKind::InvalidData("lib id"))?,
            title: book.title.clone(),
            authors: to_json(&book.authors).or_raise(|| ErrorKind::InvalidData("authors"))?,
            genres: to_json(&book.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            series: book.series.as_ref().map(|s| s.name.clone()),
            series_no: book.series.as_ref().and_then(|s| s.number).map(i64::from),
            file_name: book.file.name.clone(),
            file_ext: book.file.ext.clone(),
            file_size: i64::try_from(book.file.size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            folder: book.file.folder.clone(),
            language: book.language.clone(),
            added_on: book.added_on.map(date_to_timestamp),
            rating: book.rating.map(i64::from),
            keywords: to_json(&book.keywords).or_raise(|| ErrorKind::InvalidData("keywords"))?,
            deleted: book.deleted,
        })
    }
}

impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let series = match row.series {
            Some(name) => Some(Series {
                name,
                number: row
                    .series_no
                    .map(|n| u32::try_from(n).or_raise(|| ErrorKind::InvalidData("series number")))
                    .transpose()?,
            }),
            None => None,
        };
        Ok(Self {
            lib_id: u64::try_from(row.lib_id).or_raise(|| ErrorKind::InvalidData("lib id"))?,
            title: row.title,
            authors: from_json(&row.authors).or_raise(|| ErrorKind::InvalidData("authors"))?,
            genres: from_json(&row.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            series,
            file: BookFile {
                name: row.file_name,
                ext: row.file_ext,
                size: u64::try_from(row.file_size).or_raise(|| ErrorKind::InvalidData("file size"))?,
                folder: row.folder,
            },
            language: row.language,
            added_on: row
                .added_on
                .map(|ts| {
                    UtcDateTime::from_unix_timestamp(ts)
                        .map(|dt| dt.date())
                        .or_raise(|| ErrorKind::InvalidData("added on date"))
                })
                .transpose()?,
            rating: row.rating.map(|r| u8::try_from(r).or_raise(|| ErrorKind::InvalidData("rating"))).transpose()?,
            keywords: from_json(&row.keywords).or_raise(|| ErrorKind::InvalidData("keywords"))?,
            deleted: row.deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn test_lib_id_out_of_range() {
        let book = Book {
            lib_id: u64::MAX,
            title: String::new(),
            authors: vec![],
            genres: vec![],
            series: None,
            file: BookFile { name: String::new(), ext: String::new(), size: 0, folder: String::new() },
            language: None,
            added_on: None,
            rating: None,
            keywords: vec![],
            deleted: false,
        };
        let err = BookRow::try_from(&book).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData("lib id"));
    }

    #[test]
    fn test_dates_are_stored_as_utc_midnight() {
        let date = Date::from_calendar_date(2020, Month::January, 31).unwrap();
        assert_eq!(date_to_timestamp(date), 1_580_428_800);
    }

    #[test]
    fn test_corrupt_json_column() {
        let row = BookRow {
            lib_id: 1,
            title: "t".to_string(),
            authors: "not json".to_string(),
            genres: "[]".to_string(),
            series: None,
            series_no: None,
            file_name: "1".to_string(),
            file_ext: "fb2".to_string(),
            file_size: 1,
            folder: "a.zip".to_string(),
            language: None,
            added_on: None,
            rating: None,
            keywords: "[]".to_string(),
            deleted: false,
        };
        let err = Book::try_from(row).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData("authors"));
    }
}
