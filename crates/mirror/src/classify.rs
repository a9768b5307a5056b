//! Ordered rule table mapping raw locators to [`FormatTag`]s.

use crate::FormatTag;
use std::sync::LazyLock;

const EREADER_SUFFIXES: &[&str] = &[
    ".mobi",
    ".azw",
    ".azw3",
    ".kindle",
    ".kindle.images",
    ".kindle.noimages",
    ".kf8.images",
];
const TEXT_SUFFIXES: &[&str] = &[".txt", ".txt.utf8", ".txt.utf-8"];
const REFLOWABLE_SUFFIXES: &[&str] = &[".epub", ".epub.images", ".epub.noimages", ".epub3.images"];

static DEFAULT: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// One entry of the classification table.
///
/// The predicate receives the locator already trimmed and lowercased.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub tag: FormatTag,
    pub matches: fn(&str) -> bool,
}
impl Rule {
    pub const fn new(tag: FormatTag, matches: fn(&str) -> bool) -> Self {
        Self { tag, matches }
    }
}

/// The built-in table. First match wins; anything left over is
/// [`FormatTag::Unknown`].
const BUILTIN: [Rule; 5] = [
    Rule::new(FormatTag::EreaderImages, |l| ends_with_any(l, EREADER_SUFFIXES) && has_images_marker(l)),
    Rule::new(FormatTag::EreaderNoImages, |l| ends_with_any(l, EREADER_SUFFIXES)),
    Rule::new(FormatTag::Text, |l| ends_with_any(l, TEXT_SUFFIXES)),
    Rule::new(FormatTag::ReflowableImages, |l| ends_with_any(l, REFLOWABLE_SUFFIXES) && has_images_marker(l)),
    Rule::new(FormatTag::ReflowableNoImages, |l| ends_with_any(l, REFLOWABLE_SUFFIXES)),
];

/// Classifies variant locators by testing an ordered list of rules.
///
/// Custom rules added with [`with_rule`](Self::with_rule) are tested before
/// the built-in table, in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    custom: Vec<Rule>,
}
impl Classifier {
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.custom.push(rule);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.custom.iter().chain(BUILTIN.iter())
    }

    #[must_use]
    pub fn classify(&self, raw_locator: &str) -> FormatTag {
        let locator = raw_locator.trim().to_lowercase();
        self.rules()
            .find(|rule| (rule.matches)(&locator))
            .map(|rule| rule.tag)
            .unwrap_or(FormatTag::Unknown)
    }
}

/// Classifies a raw locator with the built-in rule table.
#[must_use]
pub fn classify(raw_locator: &str) -> FormatTag {
    DEFAULT.classify(raw_locator)
}

fn ends_with_any(locator: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| locator.ends_with(suffix))
}

/// `images` preceded by `-` or `.`, which rules out `noimages`.
fn has_images_marker(locator: &str) -> bool {
    locator
        .match_indices("images")
        .any(|(at, _)| matches!(locator.as_bytes().get(at.wrapping_sub(1)), Some(b'-' | b'.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // Mirror-style filenames.
    #[case("pg123.txt.utf8", FormatTag::Text)]
    #[case("pg123-images.epub", FormatTag::ReflowableImages)]
    #[case("pg123.epub", FormatTag::ReflowableNoImages)]
    #[case("pg123-images.mobi", FormatTag::EreaderImages)]
    #[case("pg123.mobi", FormatTag::EreaderNoImages)]
    #[case("pg123.weird", FormatTag::Unknown)]
    // Catalog-style locators.
    #[case("http://www.gutenberg.org/ebooks/2701.kindle.images", FormatTag::EreaderImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.kindle.noimages", FormatTag::EreaderNoImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.kf8.images", FormatTag::EreaderImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.txt.utf-8", FormatTag::Text)]
    #[case("http://www.gutenberg.org/files/2701/2701-0.txt", FormatTag::Text)]
    #[case("http://www.gutenberg.org/ebooks/2701.epub.images", FormatTag::ReflowableImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.epub3.images", FormatTag::ReflowableImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.epub.noimages", FormatTag::ReflowableNoImages)]
    #[case("http://www.gutenberg.org/ebooks/2701.html.images", FormatTag::Unknown)]
    #[case("http://www.gutenberg.org/cache/epub/2701/pg2701.cover.medium.jpg", FormatTag::Unknown)]
    #[case("http://www.gutenberg.org/files/2701/2701-h.zip", FormatTag::Unknown)]
    // Whitespace and case are ignored.
    #[case("  PG123.EPUB \n", FormatTag::ReflowableNoImages)]
    #[case("", FormatTag::Unknown)]
    fn test_classify(#[case] locator: &str, #[case] expected: FormatTag) {
        assert_eq!(classify(locator), expected);
    }

    #[rstest]
    #[case("pg1-images.epub", true)]
    #[case("1.epub.images", true)]
    #[case("1.epub.noimages", false)]
    #[case("pg1-noimages.epub", false)]
    #[case("images.epub", false)]
    fn test_images_marker(#[case] locator: &str, #[case] expected: bool) {
        assert_eq!(has_images_marker(locator), expected);
    }

    #[test]
    fn test_custom_rules_take_precedence() {
        let classifier = Classifier::default()
            .with_rule(Rule::new(FormatTag::Text, |l| l.ends_with(".txt.zip")))
            .with_rule(Rule::new(FormatTag::Unknown, |l| l.ends_with(".epub")));
        assert_eq!(classifier.classify("pg1.txt.zip"), FormatTag::Text);
        assert_eq!(classifier.classify("pg1.epub"), FormatTag::Unknown);
        // Built-ins still apply to everything else.
        assert_eq!(classifier.classify("pg1.mobi"), FormatTag::EreaderNoImages);
        assert_eq!(classifier.rules().count(), BUILTIN.len() + 2);
    }
}
