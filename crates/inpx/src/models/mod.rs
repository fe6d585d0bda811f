mod author;
mod info;
mod record;

pub use self::author::Author;
pub use self::info::CollectionInfo;
pub use self::record::RawRecord;
