//! SQLite index store for normalized catalog books.
//!
//! The index is the queryable side of an import: the orchestrator hands it
//! batches of [`Book`]s and a downstream catalog server reads them back. It is
//! not the source of truth; the INPX archive is. Deleting the index and
//! running a full import rebuilds it.
//!
//! # Architecture
//! - [`Book`] is the normalized entity, produced from a raw archive record by
//!   the normalizer (`From<RawRecord> for Book`).
//! - [`Index`] owns the connection pool and persists batches, one transaction
//!   per batch. In partial mode a batch upserts by library identifier; in
//!   full mode it plainly inserts into a fresh index.
//! - [`IndexStore`] is the seam the orchestrator writes through, so tests can
//!   substitute the in-memory `MockIndex` (`mock` feature).

mod db;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod storage;
mod store;

pub use crate::db::Database;
#[cfg(feature = "mock")]
pub use crate::mock::{Flush, MockIndex};
pub use crate::models::{Book, BookFile, Series};
pub use crate::storage::Storage;
pub use crate::store::{DATABASE_FILE, Index, IndexStore};
