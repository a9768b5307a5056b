//! Title normalization.
//!
//! The policy is intentionally weak: surrounding whitespace is stripped and the
//! title is lowercased, nothing more. Punctuation, leading articles and
//! spelling variants are NOT normalized, so "Gullivers Travels" will never
//! find "Gulliver's Travels". Changing this changes which queries match and
//! invalidates every existing snapshot.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Lookup key derived from a title by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedTitle(String);
impl NormalizedTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for NormalizedTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for NormalizedTitle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Canonicalizes a raw title (or query) into a lookup key.
pub fn normalize(raw: &str) -> NormalizedTitle {
    NormalizedTitle(raw.trim().to_lowercase())
}
