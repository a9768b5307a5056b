//! Parsing of Project Gutenberg RDF descriptors.
//!
//! One descriptor describes one catalog item: its identifier, title, DCMI
//! content type and the locators of every downloadable file variant. Nothing
//! else is read from the document.

mod consts;
pub mod error;
mod extract;
pub mod models;

use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
pub use crate::extract::extract;
use crate::models::Descriptor;

/// Easy, top-level entrypoint to read and parse a descriptor file from disk.
///
/// The returned entry keeps `path` as its descriptor reference, so the same
/// file can be re-parsed later to list its variants.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn parse(path: impl AsRef<Path>) -> Result<Descriptor> {
    let path = path.as_ref();
    let xml = std::fs::read(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
    extract(&xml, path)
}
