//! The record loop: skip deleted records, collapse duplicates, batch and
//! flush.

use crate::error::{ErrorKind, Result};
use crate::progress::{ImportEvent, Reporter};
use derive_more::Display;
use exn::ResultExt;
use inpxer_index::{Book, IndexStore};
use inpxer_inpx::RawRecord;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

/// Per-run import switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Treat deleted records as ordinary ones instead of skipping them.
    pub keep_deleted: bool,
    /// Update the existing index in place instead of rebuilding it.
    pub partial: bool,
}

/// Outcome of a completed import.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("{seen} records seen, {imported} imported, {duplicates} duplicates, {deleted} deleted in {elapsed:.2?}")]
pub struct Summary {
    pub seen: u64,
    pub imported: u64,
    pub duplicates: u64,
    pub deleted: u64,
    pub elapsed: Duration,
}

/// State carried across the record loop: counters, the identifier tally and
/// the batch in flight.
#[derive(Debug)]
pub(crate) struct Accumulator {
    batch_size: usize,
    keep_deleted: bool,
    tally: HashMap<u64, u32>,
    batch: Vec<Book>,
    seen: u64,
    deleted: u64,
}

impl Accumulator {
    pub(crate) fn new(batch_size: usize, keep_deleted: bool) -> Self {
        Self {
            batch_size,
            keep_deleted,
            tally: HashMap::new(),
            batch: Vec::with_capacity(batch_size + 1),
            seen: 0,
            deleted: 0,
        }
    }

    /// Account for one record. Returns `true` once the batch has grown past
    /// the batch size.
    pub(crate) fn push(&mut self, record: RawRecord) -> bool {
        self.seen += 1;
        if record.deleted && !self.keep_deleted {
            self.deleted += 1;
            return false;
        }
        match self.tally.entry(record.lib_id) {
            // First occurrence wins.
            Entry::Occupied(mut count) => {
                *count.get_mut() += 1;
                false
            },
            Entry::Vacant(slot) => {
                slot.insert(1);
                self.batch.push(Book::from(record));
                self.batch.len() > self.batch_size
            },
        }
    }

    pub(crate) fn batch(&self) -> &[Book] {
        &self.batch
    }

    pub(crate) fn clear_batch(&mut self) {
        self.batch.clear();
    }

    pub(crate) fn seen(&self) -> u64 {
        self.seen
    }

    pub(crate) fn deleted(&self) -> u64 {
        self.deleted
    }

    pub(crate) fn duplicates(&self) -> u64 {
        self.tally.values().map(|&count| u64::from(count.saturating_sub(1))).sum()
    }

    pub(crate) fn summary(&self, elapsed: Duration) -> Summary {
        let duplicates = self.duplicates();
        Summary {
            seen: self.seen,
            imported: self.seen - duplicates - self.deleted,
            duplicates,
            deleted: self.deleted,
            elapsed,
        }
    }
}

async fn flush<S, R>(store: &S, accumulator: &mut Accumulator, partial: bool, reporter: &mut R) -> Result<()>
where
    S: IndexStore + ?Sized,
    R: Reporter + ?Sized,
{
    let books = accumulator.batch().len();
    store.add_books(accumulator.batch(), partial).await.or_raise(|| ErrorKind::Flush)?;
    accumulator.clear_batch();
    tracing::debug!(books, processed = accumulator.seen(), "Flushed batch");
    reporter.report(ImportEvent::Flushed {
        processed: accumulator.seen(),
    });
    Ok(())
}

/// Drain `records` into `store`, flushing whenever the batch outgrows
/// `batch_size` and once more at the end.
///
/// Stops at the first failed flush. Whether `records` ended early is for the
/// caller to find out.
pub(crate) async fn ingest<S, R>(
    records: impl Iterator<Item = RawRecord>,
    store: &S,
    options: Options,
    batch_size: usize,
    reporter: &mut R,
) -> Result<Accumulator>
where
    S: IndexStore + ?Sized,
    R: Reporter + ?Sized,
{
    let mut accumulator = Accumulator::new(batch_size, options.keep_deleted);
    for record in records {
        if accumulator.push(record) {
            flush(store, &mut accumulator, options.partial, reporter).await?;
        }
    }
    if !accumulator.batch().is_empty() {
        flush(store, &mut accumulator, options.partial, reporter).await?;
    }
    Ok(accumulator)
}
