//! Streams an INPX catalog into the inpxer index.
//!
//! One import is a single pass over the archive's records:
//!
//! 1. deleted records are skipped unless asked to keep them,
//! 2. repeated library identifiers collapse to their first occurrence,
//! 3. survivors are normalized and flushed to the index in batches,
//! 4. freshness markers are written next to the index on success.
//!
//! See [`run`] for the entry point and [`ImportEvent`] for progress.

pub mod error;
mod ingest;
pub mod markers;
mod progress;
mod run;

pub use crate::ingest::{Options, Summary};
pub use crate::progress::{ImportEvent, Reporter, Silent};
pub use crate::run::{import, run};
