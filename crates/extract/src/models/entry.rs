use super::ContentType;
use std::path::PathBuf;

/// One bibliographic item of the catalog.
///
/// Entries are created while scanning the corpus and never change afterwards;
/// the corpus is assumed static for the lifetime of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Catalog identifier (extracted from the `ebooks/<id>` reference)
    pub id: u64,
    /// Display title, exactly as written in the descriptor (trimmed)
    pub title: String,
    /// DCMI content type
    pub content_type: ContentType,
    /// Path of the descriptor this entry was parsed from
    pub descriptor: PathBuf,
}
impl AsRef<CatalogEntry> for CatalogEntry {
    fn as_ref(&self) -> &CatalogEntry {
        self
    }
}
