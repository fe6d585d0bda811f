mod book;
mod row;

pub use self::book::{Book, BookFile, Series};
pub(crate) use self::row::BookRow;
