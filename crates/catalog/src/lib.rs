//! Title index over a corpus of catalog descriptors.
//!
//! The index maps normalized titles to catalog entries. Building it means
//! parsing every descriptor in the corpus, which is slow, so a built index can
//! be saved as a snapshot and loaded on later runs instead.
//!
//! # Architecture
//! - [`normalize`] turns titles and queries into [`NormalizedTitle`] keys.
//! - [`CatalogIndex::build`] scans a corpus directory (see [`scan`]).
//! - [`CatalogIndex::save`] and [`CatalogIndex::load`] handle snapshots.
//! - [`CatalogIndex::lookup`] answers exact-key queries.

pub mod error;
mod index;
mod normalize;
mod scan;
mod snapshot;

pub use crate::index::{CatalogIndex, Insertion};
pub use crate::normalize::{NormalizedTitle, normalize};
pub use crate::scan::{BuildOptions, BuildReport, DEFAULT_CONCURRENCY, ScanEvent, ScanOrder, Skipped, scan};
pub use folio_extract::models::{CatalogEntry, ContentType};
