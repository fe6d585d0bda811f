//! Streaming reader for INPX library catalog archives.
//!
//! An INPX archive is a zip container bundling the catalog of an online
//! library:
//!
//! - **`.inp` listings**: one record per line, fields separated by `0x04`. Each
//!   listing describes the books stored in the inner zip of the same name.
//! - **`structure.info`** (optional): the field order used by the listings.
//! - **`collection.info`** (optional): name and description of the collection.
//! - **`version.info`** (optional): the collection version string. Its
//!   modification time inside the container is used as the freshness stamp
//!   of the whole catalog (see [`version_info_modified`]).
//!
//! [`Collection`] exposes the records as a lazy, single-pass sequence. Parse
//! failures do not interrupt the caller per item; the sequence simply ends and
//! the failure is queried afterwards with [`Collection::take_error`].

mod collection;
mod consts;
pub mod error;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
pub mod models;
mod structure;
mod version;

pub use crate::collection::{Collection, Records};
pub use crate::consts::{COLLECTION_INFO, STRUCTURE_INFO, VERSION_INFO};
pub use crate::models::{Author, CollectionInfo, RawRecord};
pub use crate::structure::{Field, Structure};
pub use crate::version::version_info_modified;
