use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Qualified element and attribute names as written by the catalog generator.
// The prefixes are stable across every published feed, so there is no need to
// resolve namespaces properly.
pub(crate) const EBOOK: &str = "pgterms:ebook";
pub(crate) const FILE: &str = "pgterms:file";
pub(crate) const TITLE: &str = "dcterms:title";
pub(crate) const TYPE: &str = "dcterms:type";
pub(crate) const VALUE: &str = "rdf:value";
pub(crate) const ABOUT: &str = "rdf:about";

// The ebook element is identified as `ebooks/<id>`, sometimes as a full URL.
regex!(EBOOK_ID_REGEX, r"(?:^|/)ebooks/(\d+)/?$");
