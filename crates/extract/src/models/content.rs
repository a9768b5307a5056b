use std::fmt::{Display, Formatter, Result as FmtResult};
use std::{convert::Infallible, str::FromStr};

/// DCMI type of a catalog item.
///
/// Only [`Text`](Self::Text) items are considered books; audio recordings and
/// other media share the same catalog but are never indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ContentType {
    Text,
    Sound,
    StillImage,
    MovingImage,
    Dataset,
    Collection,
    /// Any other value found in the descriptor, kept verbatim.
    Other(String),
    /// The descriptor did not declare a type.
    #[default]
    Unknown,
}
impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Sound => "Sound",
            Self::StillImage => "StillImage",
            Self::MovingImage => "MovingImage",
            Self::Dataset => "Dataset",
            Self::Collection => "Collection",
            Self::Other(other) => other.as_str(),
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for textual works, the only kind the catalog indexes.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text)
    }
}
impl FromStr for ContentType {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "Text" => Self::Text,
            "Sound" => Self::Sound,
            "StillImage" => Self::StillImage,
            "MovingImage" => Self::MovingImage,
            "Dataset" => Self::Dataset,
            "Collection" => Self::Collection,
            "" | "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        })
    }
}
impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(content_type) => content_type,
            Err(infallible) => match infallible {},
        }
    }
}
impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
