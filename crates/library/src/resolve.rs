//! Title resolution: query, list variants, pick one, get a mirror path.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use folio_catalog::{CatalogEntry, CatalogIndex};
use folio_mirror::{Classifier, FormatTag, Mirror, MirrorPath};
use std::fmt::{self, Display};
use tracing::instrument;

/// One downloadable rendition of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVariant {
    /// The locator exactly as the descriptor lists it.
    pub raw_locator: String,
    pub format: FormatTag,
}
impl Display for FileVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.format.label(), self.raw_locator)
    }
}

/// A completed query: the entry, the chosen variant and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: CatalogEntry,
    pub variant: FileVariant,
    pub path: MirrorPath,
}

/// Answers title queries against a built or loaded [`CatalogIndex`].
///
/// Lookups never touch the filesystem. Listing variants re-reads the entry's
/// descriptor every time, so the answer reflects the corpus as it is now.
#[derive(Debug, Clone)]
pub struct Resolver {
    index: CatalogIndex,
    classifier: Classifier,
    mirror: Mirror,
}

impl Resolver {
    pub fn new(index: CatalogIndex, mirror: Mirror) -> Self {
        Self {
            index,
            classifier: Classifier::default(),
            mirror,
        }
    }

    /// Replaces the built-in classification rules.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Finds the entry whose normalized title equals the normalized query.
    ///
    /// `None` means no such title; it is an ordinary outcome, not an error.
    pub fn resolve(&self, query: &str) -> Option<&CatalogEntry> {
        let found = self.index.find(query);
        tracing::debug!(query, id = found.map(|entry| entry.id), "Resolved title");
        found
    }

    /// Lists every file variant of `entry`, in descriptor order.
    ///
    /// Positions in the returned list are the indices accepted by
    /// [`select_variant`](Self::select_variant).
    #[instrument(level = "debug", skip_all, fields(id = entry.id))]
    pub fn list_variants(&self, entry: &CatalogEntry) -> Result<Vec<FileVariant>> {
        let descriptor =
            folio_extract::parse(&entry.descriptor).or_raise(|| ErrorKind::Descriptor(entry.descriptor.clone()))?;
        Ok(descriptor
            .variants
            .into_iter()
            .map(|raw_locator| FileVariant {
                format: self.classifier.classify(&raw_locator),
                raw_locator,
            })
            .collect())
    }

    /// Translates the variant at `index` of [`list_variants`](Self::list_variants)
    /// into a mirror path.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::VariantIndexOutOfRange`] if `index` is past the end of
    ///   the list
    /// - [`ErrorKind::UnsupportedFormat`] if the variant's format has no mirror
    ///   counterpart
    /// - [`ErrorKind::Descriptor`] if the descriptor can no longer be read
    pub fn select_variant(&self, entry: &CatalogEntry, index: usize) -> Result<MirrorPath> {
        let variants = self.list_variants(entry)?;
        self.locate(entry, &variants, index).map(|(_, path)| path)
    }

    /// Starts a step-by-step query for `title`.
    ///
    /// ```no_run
    /// # use folio_library::Resolver;
    /// # fn example(resolver: &Resolver) -> folio_library::error::Result<()> {
    /// if let Some(query) = resolver.query("Moby Dick; Or, The Whale") {
    ///     let listed = query.variants()?;
    ///     for (number, variant) in listed.list().iter().enumerate() {
    ///         println!("{number}: {variant}");
    ///     }
    ///     let resolution = listed.select(0)?;
    ///     println!("{}", resolution.path);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn query(&self, title: &str) -> Option<Query<'_, Matched>> {
        self.resolve(title).map(|entry| Query {
            resolver: self,
            entry,
            state: Matched,
        })
    }

    fn locate<'v>(
        &self,
        entry: &CatalogEntry,
        variants: &'v [FileVariant],
        index: usize,
    ) -> Result<(&'v FileVariant, MirrorPath)> {
        let variant = variants.get(index).ok_or_raise(|| ErrorKind::VariantIndexOutOfRange {
            index,
            len: variants.len(),
        })?;
        let path = self
            .mirror
            .locate(entry.id, variant.format)
            .or_raise(|| ErrorKind::UnsupportedFormat(variant.raw_locator.clone()))?;
        tracing::debug!(id = entry.id, index, format = %variant.format, path = %path, "Selected variant");
        Ok((variant, path))
    }
}

mod sealed {
    pub trait Sealed {}
}
pub trait QueryState: sealed::Sealed {}

/// A title matched an entry.
#[derive(Debug)]
pub struct Matched;
impl sealed::Sealed for Matched {}
impl QueryState for Matched {}

/// The matched entry's variants have been listed.
#[derive(Debug)]
pub struct Listed {
    variants: Vec<FileVariant>,
}
impl sealed::Sealed for Listed {}
impl QueryState for Listed {}

/// An in-progress query. Selection is only possible once variants have been
/// listed, and selects from exactly the list that was shown.
#[derive(Debug)]
pub struct Query<'r, S: QueryState = Matched> {
    resolver: &'r Resolver,
    entry: &'r CatalogEntry,
    state: S,
}
impl<'r, S: QueryState> Query<'r, S> {
    pub fn entry(&self) -> &'r CatalogEntry {
        self.entry
    }
}
impl<'r> Query<'r, Matched> {
    pub fn variants(self) -> Result<Query<'r, Listed>> {
        let variants = self.resolver.list_variants(self.entry)?;
        Ok(Query {
            resolver: self.resolver,
            entry: self.entry,
            state: Listed { variants },
        })
    }
}
impl Query<'_, Listed> {
    pub fn list(&self) -> &[FileVariant] {
        &self.state.variants
    }

    /// Picks the variant at `index` of [`list`](Self::list). Failed selections
    /// leave the query usable for another attempt.
    pub fn select(&self, index: usize) -> Result<Resolution> {
        let (variant, path) = self.resolver.locate(self.entry, &self.state.variants, index)?;
        Ok(Resolution {
            entry: self.entry.clone(),
            variant: variant.clone(),
            path,
        })
    }
}
