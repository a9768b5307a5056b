//! Translation of catalog identifiers into mirror download paths.

use crate::FormatTag;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Mirror that asks to be used by automated clients instead of the main site.
pub const DEFAULT_MIRROR_BASE: &str = "http://gutenberg.pglaf.org/cache/epub";

/// Remote location of one file on the mirror.
///
/// Computed on demand and never cached; it is only a string, fetching it is
/// somebody else's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorPath(String);
impl MirrorPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, useful as a local filename.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}
impl AsRef<str> for MirrorPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
impl From<MirrorPath> for String {
    fn from(path: MirrorPath) -> Self {
        path.0
    }
}
impl Display for MirrorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// The distribution mirror and its directory layout: `<base>/<id>/<filename>`.
///
/// # Examples
///
/// ```
/// use folio_mirror::{FormatTag, Mirror};
///
/// let mirror = Mirror::new("http://mirror.example/cache/epub/");
/// let path = mirror.locate(2701, FormatTag::Text).unwrap();
/// assert_eq!(path.as_str(), "http://mirror.example/cache/epub/2701/pg2701.txt.utf8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    base: String,
}
impl Default for Mirror {
    fn default() -> Self {
        Self::new(DEFAULT_MIRROR_BASE)
    }
}
impl Mirror {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Builds the mirror path for a catalog identifier in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) for
    /// [`FormatTag::Unknown`]; there is no file on the mirror to point at.
    pub fn locate(&self, id: u64, format: FormatTag) -> Result<MirrorPath> {
        let filename = format
            .mirror_filename(id)
            .ok_or_raise(|| ErrorKind::UnsupportedFormat(format.as_str().to_string()))?;
        let path = MirrorPath(format!("{}/{id}/{filename}", self.base));
        tracing::debug!(id, format = %format, path = %path, "Located file on mirror");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_locate_text() {
        let mirror = Mirror::default();
        let path = mirror.locate(123, FormatTag::Text).unwrap();
        assert_eq!(path.as_str(), format!("{DEFAULT_MIRROR_BASE}/123/pg123.txt.utf8"));
        assert_eq!(path.file_name(), "pg123.txt.utf8");
    }

    #[test]
    fn test_locate_is_injective_in_format() {
        let mirror = Mirror::default();
        let paths: HashSet<_> = FormatTag::ALL
            .into_iter()
            .filter(FormatTag::is_known)
            .map(|tag| mirror.locate(2701, tag).unwrap())
            .collect();
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_locate_unknown_is_rejected() {
        let err = Mirror::default().locate(123, FormatTag::Unknown).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat("unknown".to_string()));
    }

    #[test]
    fn test_trailing_slashes_are_ignored() {
        let mirror = Mirror::new("https://example.org/epub//");
        assert_eq!(mirror.base(), "https://example.org/epub");
        let path = mirror.locate(7, FormatTag::EreaderImages).unwrap();
        assert_eq!(path.as_str(), "https://example.org/epub/7/pg7-images.mobi");
    }
}
