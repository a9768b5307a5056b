use super::CatalogEntry;

/// Everything a single descriptor says about its catalog item.
///
/// The variant locators are kept raw and in document order; classifying them
/// is somebody else's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub entry: CatalogEntry,
    /// `rdf:about` of every `pgterms:file`, in the order they appear
    pub variants: Vec<String>,
}
impl From<Descriptor> for CatalogEntry {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.entry
    }
}
