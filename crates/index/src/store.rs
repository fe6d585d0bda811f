//! The index store and the trait the importer writes through.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Book, BookRow};
use crate::storage::Storage;
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tracing::instrument;

/// File name of the SQLite database inside the index directory.
pub const DATABASE_FILE: &str = "index.sqlite";
const LANGUAGE_KEY: &str = "language";

/// Destination for batches of normalized books.
///
/// `add_books` receives a read-only view of the batch for the duration of the
/// call; the caller keeps ownership and reuses its buffer afterwards.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Persist a batch.
    ///
    /// With `partial` set, books whose library identifier is already in the
    /// index replace the stored entry; otherwise the index is assumed to be
    /// freshly created and books are simply added.
    async fn add_books(&self, books: &[Book], partial: bool) -> Result<()>;

    /// Release the store. Further calls are not supported.
    async fn close(&self);
}

/// SQLite-backed index.
#[derive(Debug, Clone)]
pub struct Index {
    db: Database,
    path: PathBuf,
    language: String,
    storage: Storage,
}

impl Index {
    /// Open the index at `path`, creating it if it does not exist.
    ///
    /// For [`Storage::Disk`] the directory is created (with parents) and the
    /// database lives in [`DATABASE_FILE`] inside it. The language is recorded
    /// in the index metadata; reopening an index built for another language
    /// logs a warning and records the new one.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), %storage))]
    pub async fn create(path: impl AsRef<Path>, language: impl Into<String>, storage: Storage) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let language = language.into().trim().to_string();
        if language.is_empty() {
            exn::bail!(ErrorKind::InvalidData("language"));
        }
        let db = match storage {
            Storage::Disk => {
                tokio::fs::create_dir_all(&path).await.or_raise(|| ErrorKind::Io)?;
                Database::connect(path.join(DATABASE_FILE)).await?
            },
            Storage::Memory => Database::connect_in_memory().await?,
        };
        let index = Self { db, path, language, storage };
        index.record_language().await?;
        Ok(index)
    }

    async fn record_language(&self) -> Result<()> {
        let existing: Option<(String,)> = sqlx::query_as(include_str!("../queries/get_meta.sql"))
            .bind(LANGUAGE_KEY)
            .fetch_optional(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        if let Some((existing,)) = existing
            && existing != self.language
        {
            tracing::warn!(
                previous = %existing,
                language = %self.language,
                "Index was built for a different language"
            );
        }
        sqlx::query(include_str!("../queries/set_meta.sql"))
            .bind(LANGUAGE_KEY)
            .bind(&self.language)
            .execute(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// Persist a batch in a single transaction.
    ///
    /// Either the whole batch is stored or none of it is. Earlier batches
    /// are unaffected by a failure here.
    #[instrument(skip(self, books), fields(books = books.len()))]
    pub async fn add_books(&self, books: &[Book], partial: bool) -> Result<()> {
        if books.is_empty() {
            return Ok(());
        }
        let query = if partial {
            include_str!("../queries/upsert_book.sql")
        } else {
            include_str!("../queries/insert_book.sql")
        };
        let indexed_at = UtcDateTime::now().unix_timestamp();
        let mut tx = self.db.pool().begin().await.or_raise(|| ErrorKind::Database)?;
        for book in books {
            let row = BookRow::try_from(book)?;
            sqlx::query(query)
                .bind(row.lib_id)
                .bind(row.title)
                .bind(row.authors)
                .bind(row.genres)
                .bind(row.series)
                .bind(row.series_no)
                .bind(row.file_name)
                .bind(row.file_ext)
                .bind(row.file_size)
                .bind(row.folder)
                .bind(row.language)
                .bind(row.added_on)
                .bind(row.rating)
                .bind(row.keywords)
                .bind(row.deleted)
                .bind(indexed_at)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::debug!("Batch committed");
        Ok(())
    }

    /// Look up a book by library identifier.
    pub async fn get(&self, lib_id: u64) -> Result<Option<Book>> {
        let lib_id = i64::try_from(lib_id).or_raise(|| ErrorKind::InvalidData("lib id"))?;
        let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/get_book.sql"))
            .bind(lib_id)
            .fetch_optional(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Book::try_from).transpose()
    }

    /// Number of books in the index.
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(include_str!("../queries/count_books.sql"))
            .fetch_one(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[async_trait]
impl IndexStore for Index {
    async fn add_books(&self, books: &[Book], partial: bool) -> Result<()> {
        Index::add_books(self, books, partial).await
    }

    async fn close(&self) {
        Index::close(self).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookFile, Series};
    use rstest::rstest;

    fn book(lib_id: u64, title: &str) -> Book {
        Book {
            lib_id,
            title: title.to_string(),
            authors: vec!["John Doe".to_string()],
            genres: vec!["prose".to_string()],
            series: Some(Series { name: "Saga".to_string(), number: Some(2) }),
            file: BookFile {
                name: lib_id.to_string(),
                ext: "fb2".to_string(),
                size: 1024,
                folder: "fb2-1.zip".to_string(),
            },
            language: Some("en".to_string()),
            added_on: None,
            rating: Some(3),
            keywords: vec![],
            deleted: false,
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        index.add_books(&[book(1, "One"), book(2, "Two")], false).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 2);
        assert_eq!(index.get(2).await.unwrap(), Some(book(2, "Two")));
        assert_eq!(index.get(3).await.unwrap(), None);
        index.close().await;
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        index.add_books(&[], false).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_full_mode_rejects_repeated_identifier() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        index.add_books(&[book(1, "One")], false).await.unwrap();
        let err = index.add_books(&[book(1, "Again")], false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        assert_eq!(index.get(1).await.unwrap().unwrap().title, "One");
    }

    #[tokio::test]
    async fn test_partial_mode_replaces_existing() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        index.add_books(&[book(1, "One"), book(2, "Two")], false).await.unwrap();
        index.add_books(&[book(2, "Two, revised"), book(3, "Three")], true).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 3);
        assert_eq!(index.get(2).await.unwrap().unwrap().title, "Two, revised");
    }

    #[tokio::test]
    async fn test_failed_batch_is_rolled_back() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        index.add_books(&[book(1, "One")], false).await.unwrap();
        // Second book collides with the first batch; the whole batch goes.
        let result = index.add_books(&[book(5, "Five"), book(1, "One again")], false).await;
        assert!(result.is_err());
        assert_eq!(index.count().await.unwrap(), 1);
        assert_eq!(index.get(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disk_index_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index");
        let index = Index::create(&path, "en", Storage::Disk).await.unwrap();
        index.add_books(&[book(7, "Seven")], false).await.unwrap();
        index.close().await;
        assert!(path.join(DATABASE_FILE).exists());

        let index = Index::create(&path, "en", Storage::Disk).await.unwrap();
        assert_eq!(index.get(7).await.unwrap().unwrap().title, "Seven");
        index.close().await;
    }

    #[tokio::test]
    async fn test_language_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::create(dir.path(), "en", Storage::Disk).await.unwrap();
        index.close().await;
        let index = Index::create(dir.path(), " ru ", Storage::Disk).await.unwrap();
        assert_eq!(index.language(), "ru");
        let (stored,): (String,) = sqlx::query_as("SELECT value FROM index_meta WHERE key = 'language'")
            .fetch_one(index.db.pool())
            .await
            .unwrap();
        assert_eq!(stored, "ru");
        index.close().await;
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_empty_language_is_rejected(#[case] language: &str) {
        let err = Index::create("unused", language, Storage::Memory).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("language"));
    }

    #[tokio::test]
    async fn test_trait_object_delegates() {
        let index = Index::create("unused", "en", Storage::Memory).await.unwrap();
        let store: &dyn IndexStore = &index;
        store.add_books(&[book(1, "One")], true).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
        store.close().await;
    }
}
