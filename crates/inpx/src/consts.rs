/// Archive entry holding the collection version string.
pub const VERSION_INFO: &str = "version.info";
/// Archive entry describing the collection.
pub const COLLECTION_INFO: &str = "collection.info";
/// Archive entry overriding the listing field order.
pub const STRUCTURE_INFO: &str = "structure.info";

pub(crate) const LISTING_EXTENSION: &str = "inp";
pub(crate) const BOOK_ARCHIVE_EXTENSION: &str = "zip";

pub(crate) const FIELD_SEPARATOR: char = '\u{4}';
pub(crate) const LIST_SEPARATOR: char = ':';
pub(crate) const NAME_SEPARATOR: char = ',';
pub(crate) const KEYWORD_SEPARATOR: char = ',';
pub(crate) const STRUCTURE_SEPARATOR: char = ';';

/// Field order used when the archive carries no `structure.info`.
pub(crate) const DEFAULT_STRUCTURE: &str = "AUTHOR;GENRE;TITLE;SERIES;SERNO;FILE;SIZE;LIBID;DEL;EXT;DATE;LANG;LIBRATE;KEYWORDS;";
