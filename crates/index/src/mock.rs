//! In-memory index store for testing.

use crate::error::{ErrorKind, Result};
use crate::models::Book;
use crate::store::IndexStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One call to [`IndexStore::add_books`], as seen by [`MockIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct Flush {
    pub books: Vec<Book>,
    pub partial: bool,
}

/// Index store that records every batch it receives.
///
/// Batches live behind a [`RwLock`] so that the trait methods can operate on
/// `&self`. A store built with [`MockIndex::failing_on`] rejects the nth flush
/// (counting from one) with [`ErrorKind::Database`], without recording it.
#[derive(Debug, Default)]
pub struct MockIndex {
    flushes: RwLock<Vec<Flush>>,
    fail_on: Option<usize>,
    closed: AtomicBool,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(flush: usize) -> Self {
        Self {
            fail_on: Some(flush),
            ..Self::default()
        }
    }

    /// Every batch received so far, in order.
    pub async fn batches(&self) -> Vec<Flush> {
        self.flushes.read().await.clone()
    }

    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.flushes.read().await.iter().map(|flush| flush.books.len()).collect()
    }

    /// Library identifiers of every stored book, in arrival order.
    pub async fn lib_ids(&self) -> Vec<u64> {
        self.flushes
            .read()
            .await
            .iter()
            .flat_map(|flush| flush.books.iter().map(|book| book.lib_id))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexStore for MockIndex {
    async fn add_books(&self, books: &[Book], partial: bool) -> Result<()> {
        let mut flushes = self.flushes.write().await;
        if self.fail_on == Some(flushes.len() + 1) {
            exn::bail!(ErrorKind::Database);
        }
        flushes.push(Flush {
            books: books.to_vec(),
            partial,
        });
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inpxer_inpx::RawRecord;

    fn book(lib_id: u64) -> Book {
        Book::from(RawRecord {
            lib_id,
            title: format!("Book {lib_id}"),
            ..RawRecord::default()
        })
    }

    #[tokio::test]
    async fn test_records_batches() {
        let mock = MockIndex::new();
        mock.add_books(&[book(1), book(2)], false).await.unwrap();
        mock.add_books(&[book(3)], true).await.unwrap();
        assert_eq!(mock.batch_sizes().await, vec![2, 1]);
        assert_eq!(mock.lib_ids().await, vec![1, 2, 3]);
        assert!(mock.batches().await[1].partial);
    }

    #[tokio::test]
    async fn test_fails_on_requested_flush() {
        let mock = MockIndex::failing_on(2);
        mock.add_books(&[book(1)], false).await.unwrap();
        let err = mock.add_books(&[book(2)], false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        assert_eq!(mock.lib_ids().await, vec![1]);
    }

    #[tokio::test]
    async fn test_close() {
        let mock = MockIndex::new();
        assert!(!mock.is_closed());
        mock.close().await;
        assert!(mock.is_closed());
    }
}
