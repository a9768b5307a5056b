//! File variant classification and mirror path translation.
//!
//! The catalog describes downloadable files with locators that point at the
//! primary site (`https://www.gutenberg.org/ebooks/2701.kindle.images`), while
//! downloads must go to a mirror with a different directory layout
//! (`<base>/2701/pg2701-images.mobi`). This crate provides:
//!
//! - **Classification** of raw locators into a closed set of [`FormatTag`]s
//!   through an ordered rule table ([`Classifier`], [`classify`])
//! - **Translation** of `(id, FormatTag)` into a [`MirrorPath`] ([`Mirror`])

mod classify;
pub mod error;
mod format;
mod locate;

pub use crate::classify::{Classifier, Rule, classify};
pub use crate::locate::{DEFAULT_MIRROR_BASE, Mirror, MirrorPath};

/// The format of one downloadable rendition of a catalog item.
///
/// [`Unknown`](Self::Unknown) is a legitimate classification: front ends must
/// still show it so that users are never offered fewer options than exist,
/// but it cannot be located on the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// Plain UTF-8 text
    Text,
    /// E-reader (Kindle/MOBI) file with images
    EreaderImages,
    /// E-reader (Kindle/MOBI) file without images
    EreaderNoImages,
    /// Reflowable (EPUB) document with images
    ReflowableImages,
    /// Reflowable (EPUB) document without images
    ReflowableNoImages,
    /// Anything the rule table did not recognise
    Unknown,
}

impl FormatTag {
    /// Every tag, in classification order.
    pub const ALL: [FormatTag; 6] = [
        FormatTag::EreaderImages,
        FormatTag::EreaderNoImages,
        FormatTag::Text,
        FormatTag::ReflowableImages,
        FormatTag::ReflowableNoImages,
        FormatTag::Unknown,
    ];
}
