mod content;
mod descriptor;
mod entry;

pub use self::content::ContentType;
pub use self::descriptor::Descriptor;
pub use self::entry::CatalogEntry;
