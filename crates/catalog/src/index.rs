//! The in-memory title index.

use crate::normalize::{NormalizedTitle, normalize};
use folio_extract::models::CatalogEntry;
use std::collections::HashMap;

/// Outcome of inserting an entry into a [`CatalogIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The title was not in the index yet.
    Inserted,
    /// Another entry had the same normalized title; it has been overwritten
    /// and is returned here.
    Replaced(CatalogEntry),
    /// Only textual works are indexed; the entry was dropped.
    NotTextual,
}

/// Mapping from [`NormalizedTitle`] to [`CatalogEntry`].
///
/// Every key is the normalized title of its entry, and every entry is a
/// textual work; [`insert`](Self::insert) is the only way in and enforces
/// both. Once built (or loaded) the index is treated as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    entries: HashMap<NormalizedTitle, CatalogEntry>,
}
impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry under its normalized title. Last write wins.
    pub fn insert(&mut self, entry: CatalogEntry) -> Insertion {
        if !entry.content_type.is_textual() {
            return Insertion::NotTextual;
        }
        match self.entries.insert(normalize(&entry.title), entry) {
            Some(previous) => Insertion::Replaced(previous),
            None => Insertion::Inserted,
        }
    }

    /// Exact-key retrieval; no partial or fuzzy matching.
    pub fn lookup(&self, key: &NormalizedTitle) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    /// Normalizes `title` and looks it up.
    pub fn find(&self, title: &str) -> Option<&CatalogEntry> {
        self.lookup(&normalize(title))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every `(key, entry)` pair in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedTitle, &CatalogEntry)> {
        self.entries.iter()
    }
}
impl Extend<CatalogEntry> for CatalogIndex {
    fn extend<T: IntoIterator<Item = CatalogEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}
impl FromIterator<CatalogEntry> for CatalogIndex {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use folio_extract::models::ContentType;
    use std::path::PathBuf;

    pub(crate) fn entry(id: u64, title: &str, content_type: ContentType) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.to_string(),
            content_type,
            descriptor: PathBuf::from(format!("cache/epub/{id}/pg{id}.rdf")),
        }
    }

    #[test]
    fn test_lookup_is_exact_on_normalized_key() {
        let index: CatalogIndex = [entry(2701, "Moby Dick", ContentType::Text)].into_iter().collect();
        assert_eq!(index.find("  MOBY DICK ").map(|e| e.id), Some(2701));
        assert_eq!(index.lookup(&normalize("moby dick")).map(|e| e.id), Some(2701));
        assert!(index.find("moby").is_none());
        assert!(index.find("moby dick; or, the whale").is_none());
    }

    #[test]
    fn test_last_insert_wins() {
        let mut index = CatalogIndex::new();
        assert_eq!(index.insert(entry(1, "Poems", ContentType::Text)), Insertion::Inserted);
        let replaced = index.insert(entry(2, "POEMS", ContentType::Text));
        assert_eq!(replaced, Insertion::Replaced(entry(1, "Poems", ContentType::Text)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find("poems").map(|e| e.id), Some(2));
    }

    #[test]
    fn test_non_textual_entries_are_dropped() {
        let mut index = CatalogIndex::new();
        assert_eq!(index.insert(entry(3, "Moby Dick", ContentType::Sound)), Insertion::NotTextual);
        assert_eq!(index.insert(entry(4, "Mystery", ContentType::Unknown)), Insertion::NotTextual);
        assert!(index.is_empty());
    }

    #[test]
    fn test_keys_are_normalized_titles() {
        let index: CatalogIndex = [
            entry(1, " Emma ", ContentType::Text),
            entry(2, "ULYSSES", ContentType::Text),
        ]
        .into_iter()
        .collect();
        for (key, entry) in index.iter() {
            assert_eq!(*key, normalize(&entry.title));
        }
    }
}
