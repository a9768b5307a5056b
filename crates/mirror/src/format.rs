use crate::FormatTag;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

impl FormatTag {
    /// Returns the stable short name (for configuration and logs).
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Text => "text",
            FormatTag::EreaderImages => "ereader-images",
            FormatTag::EreaderNoImages => "ereader-noimages",
            FormatTag::ReflowableImages => "reflowable-images",
            FormatTag::ReflowableNoImages => "reflowable-noimages",
            FormatTag::Unknown => "unknown",
        }
    }

    /// Returns a human readable description, for listing options to a user.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            FormatTag::Text => "Plain text file",
            FormatTag::EreaderImages => "Kindle file with images",
            FormatTag::EreaderNoImages => "Kindle file without images",
            FormatTag::ReflowableImages => "EPUB file with images",
            FormatTag::ReflowableNoImages => "EPUB file without images",
            FormatTag::Unknown => "Unrecognised format",
        }
    }

    /// Filename of this format on the mirror, or `None` for
    /// [`Unknown`](Self::Unknown).
    ///
    /// Note that the mirror calls Kindle files `.mobi`, whereas the catalog
    /// still calls them `kindle`.
    #[must_use]
    pub fn mirror_filename(&self, id: u64) -> Option<String> {
        Some(match self {
            FormatTag::EreaderImages => format!("pg{id}-images.mobi"),
            FormatTag::EreaderNoImages => format!("pg{id}.mobi"),
            FormatTag::Text => format!("pg{id}.txt.utf8"),
            FormatTag::ReflowableImages => format!("pg{id}-images.epub"),
            FormatTag::ReflowableNoImages => format!("pg{id}.epub"),
            FormatTag::Unknown => return None,
        })
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FormatTag::Unknown)
    }
}

impl FromStr for FormatTag {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        FormatTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::from(ErrorKind::UnsupportedFormat(s)))
    }
}

impl Display for FormatTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(FormatTag::EreaderImages, Some("pg123-images.mobi"))]
    #[case(FormatTag::EreaderNoImages, Some("pg123.mobi"))]
    #[case(FormatTag::Text, Some("pg123.txt.utf8"))]
    #[case(FormatTag::ReflowableImages, Some("pg123-images.epub"))]
    #[case(FormatTag::ReflowableNoImages, Some("pg123.epub"))]
    #[case(FormatTag::Unknown, None)]
    fn test_mirror_filename(#[case] tag: FormatTag, #[case] expected: Option<&str>) {
        assert_eq!(tag.mirror_filename(123).as_deref(), expected);
    }

    #[test]
    fn test_names_parse_back() {
        for tag in FormatTag::ALL {
            assert_eq!(tag.as_str().parse::<FormatTag>().unwrap(), tag);
        }
        assert!("pdf".parse::<FormatTag>().is_err());
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels: HashSet<_> = FormatTag::ALL.iter().map(FormatTag::label).collect();
        assert_eq!(labels.len(), FormatTag::ALL.len());
    }
}
