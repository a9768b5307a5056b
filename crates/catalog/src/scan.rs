//! Corpus scanning and index construction.
//!
//! Building is an embarrassingly parallel map (parse every descriptor) followed
//! by a single-threaded reduce (insert into the index). Parses run on Tokio's
//! blocking pool, at most [`BuildOptions::concurrency`] at a time, and are
//! merged back with [`buffered`](futures::StreamExt::buffered), which yields
//! results in enumeration order. The reduce therefore sees exactly the order a
//! sequential scan would, and "last scanned wins" means the same thing either
//! way.

use crate::error::{ErrorKind, Result};
use crate::index::{CatalogIndex, Insertion};
use async_stream::stream;
use exn::ResultExt;
use folio_extract::models::CatalogEntry;
use futures::{Stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

const DESCRIPTOR_EXTENSION: &str = "rdf";
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Order in which descriptors are fed to the index.
///
/// Scan order decides which entry survives a title collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    /// Whatever order the filesystem lists directories in. Not guaranteed to
    /// be stable across runs or platforms.
    #[default]
    Filesystem,
    /// Sorted by file name within each directory; deterministic.
    Sorted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub order: ScanOrder,
    /// Maximum number of descriptors being read and parsed at once.
    pub concurrency: usize,
}
impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            order: ScanOrder::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// A descriptor that was left out of the index, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a build. Individual failures are collected here instead of
/// aborting the build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Descriptor files found under the corpus root.
    pub discovered: u64,
    /// Entries in the finished index.
    pub indexed: usize,
    /// Parsed successfully but not a textual work.
    pub non_textual: u64,
    /// Entries overwritten by a later entry with the same normalized title.
    pub collisions: u64,
    pub skipped: Vec<Skipped>,
    pub elapsed: Duration,
}
impl BuildReport {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

pub enum ScanEvent {
    Started,
    DiscoveryComplete(u64),
    Parsed(CatalogEntry),
    Skipped(Skipped),
    Complete,
}

struct Discovery {
    descriptors: Vec<PathBuf>,
    unreadable: Vec<Skipped>,
}

/// Streams the parse result of every descriptor under `root`, in scan order.
///
/// The only error the stream yields is [`ErrorKind::CorpusUnavailable`];
/// per-descriptor failures arrive as [`ScanEvent::Skipped`].
pub fn scan<'a>(root: &'a Path, options: &'a BuildOptions) -> impl Stream<Item = Result<ScanEvent>> + 'a {
    stream! {
        yield Ok(ScanEvent::Started);
        match discover(root.to_path_buf(), options.order).await {
            Err(err) => {
                yield Err(err);
            },
            Ok(Discovery { descriptors, unreadable }) => {
                yield Ok(ScanEvent::DiscoveryComplete(descriptors.len() as u64));
                for skipped in unreadable {
                    yield Ok(ScanEvent::Skipped(skipped));
                }
                let parsed = futures::stream::iter(descriptors)
                    .map(parse_blocking)
                    .buffered(options.concurrency.max(1));
                for await result in parsed {
                    yield Ok(match result {
                        Ok(entry) => ScanEvent::Parsed(entry),
                        Err(skipped) => ScanEvent::Skipped(skipped),
                    });
                }
                yield Ok(ScanEvent::Complete);
            },
        }
    }
}

impl CatalogIndex {
    /// Scans the corpus under `root` and builds a fresh index.
    ///
    /// Descriptors that cannot be parsed are skipped and listed in the
    /// [`BuildReport`]; non-textual works are filtered out. Dropping the
    /// returned future abandons the build; the partial index is never
    /// exposed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorpusUnavailable`] if `root` is not a readable
    /// directory.
    pub async fn build(root: impl AsRef<Path>, options: &BuildOptions) -> Result<(Self, BuildReport)> {
        let root = root.as_ref();
        let started = Instant::now();
        tracing::info!(root = %root.display(), order = ?options.order, concurrency = options.concurrency, "Building catalog index");
        let mut index = CatalogIndex::new();
        let mut report = BuildReport::default();
        let mut events = std::pin::pin!(scan(root, options));
        while let Some(event) = events.try_next().await? {
            match event {
                ScanEvent::DiscoveryComplete(count) => {
                    report.discovered = count;
                    tracing::debug!(count, "Descriptor discovery complete");
                },
                ScanEvent::Parsed(entry) => match index.insert(entry) {
                    Insertion::Inserted => {},
                    Insertion::Replaced(previous) => {
                        tracing::debug!(id = previous.id, title = %previous.title, "Title collision; keeping the later entry");
                        report.collisions += 1;
                    },
                    Insertion::NotTextual => report.non_textual += 1,
                },
                ScanEvent::Skipped(skipped) => {
                    tracing::warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipping descriptor");
                    report.skipped.push(skipped);
                },
                ScanEvent::Started | ScanEvent::Complete => {},
            }
        }
        report.indexed = index.len();
        report.elapsed = started.elapsed();
        tracing::info!(
            indexed = report.indexed,
            skipped = report.skip_count(),
            collisions = report.collisions,
            elapsed = ?report.elapsed,
            "Catalog index built"
        );
        Ok((index, report))
    }
}

async fn discover(root: PathBuf, order: ScanOrder) -> Result<Discovery> {
    let fallback = root.clone();
    tokio::task::spawn_blocking(move || discover_blocking(&root, order))
        .await
        .or_raise(|| ErrorKind::CorpusUnavailable(fallback.clone()))?
}

fn discover_blocking(root: &Path, order: ScanOrder) -> Result<Discovery> {
    if !root.is_dir() {
        exn::bail!(ErrorKind::CorpusUnavailable(root.to_path_buf()));
    }
    let mut walker = WalkDir::new(root).follow_links(true);
    if order == ScanOrder::Sorted {
        walker = walker.sort_by_file_name();
    }
    let mut discovery = Discovery {
        descriptors: Vec::new(),
        unreadable: Vec::new(),
    };
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_descriptor(entry.path()) => {
                discovery.descriptors.push(entry.into_path());
            },
            Ok(_) => {},
            Err(err) if err.depth() == 0 => {
                return Err(err).or_raise(|| ErrorKind::CorpusUnavailable(root.to_path_buf()));
            },
            Err(err) => discovery.unreadable.push(Skipped {
                path: err.path().unwrap_or(root).to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
    Ok(discovery)
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
}

async fn parse_blocking(path: PathBuf) -> std::result::Result<CatalogEntry, Skipped> {
    // Snapshots store descriptor paths as JSON strings.
    if path.to_str().is_none() {
        return Err(Skipped {
            path,
            reason: "descriptor path is not valid UTF-8".to_string(),
        });
    }
    let worker_path = path.clone();
    match tokio::task::spawn_blocking(move || folio_extract::parse(worker_path)).await {
        Ok(Ok(descriptor)) => Ok(descriptor.into()),
        Ok(Err(err)) => Err(Skipped { path, reason: (*err).to_string() }),
        Err(join) => Err(Skipped { path, reason: join.to_string() }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::normalize::normalize;
    use std::fs;

    pub(crate) fn rdf(id: u64, title: &str, content_type: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:pgterms="http://www.gutenberg.org/2009/pgterms/" xmlns:dcterms="http://purl.org/dc/terms/">
  <pgterms:ebook rdf:about="ebooks/{id}">
    <dcterms:title>{title}</dcterms:title>
    <dcterms:type><rdf:Description><rdf:value>{content_type}</rdf:value></rdf:Description></dcterms:type>
    <dcterms:hasFormat><pgterms:file rdf:about="http://www.gutenberg.org/ebooks/{id}.txt.utf-8"/></dcterms:hasFormat>
    <dcterms:hasFormat><pgterms:file rdf:about="http://www.gutenberg.org/ebooks/{id}.epub.images"/></dcterms:hasFormat>
  </pgterms:ebook>
</rdf:RDF>
"#
        )
    }

    /// Lays descriptors out the way the catalog archive does:
    /// `<root>/<id>/pg<id>.rdf`.
    pub(crate) fn write_descriptor(root: &Path, id: u64, contents: &str) -> PathBuf {
        let dir = root.join(id.to_string());
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("pg{id}.rdf"));
        fs::write(&path, contents).unwrap();
        path
    }

    fn sorted() -> BuildOptions {
        BuildOptions {
            order: ScanOrder::Sorted,
            concurrency: 4,
        }
    }

    #[tokio::test]
    async fn test_build_skips_malformed_descriptor() {
        let corpus = tempfile::tempdir().unwrap();
        write_descriptor(corpus.path(), 1, &rdf(1, "Emma", "Text"));
        write_descriptor(corpus.path(), 2, &rdf(2, "Persuasion", "Text"));
        let broken = write_descriptor(corpus.path(), 3, "<rdf:RDF><pgterms:ebook rdf:about=\"ebooks/3\"></pgterms:ebook></rdf:RDF>");

        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.find("emma").map(|e| e.id), Some(1));
        assert_eq!(index.find("persuasion").map(|e| e.id), Some(2));
        assert_eq!(report.discovered, 3);
        assert_eq!(report.indexed, 2);
        assert_eq!(report.skip_count(), 1);
        assert_eq!(report.skipped[0].path, broken);
        assert!(report.skipped[0].reason.contains("title"));
    }

    #[tokio::test]
    async fn test_build_filters_non_textual_works() {
        let corpus = tempfile::tempdir().unwrap();
        write_descriptor(corpus.path(), 10, &rdf(10, "Moby Dick", "Text"));
        write_descriptor(corpus.path(), 11, &rdf(11, "Moby Dick (Audio)", "Sound"));
        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(report.non_textual, 1);
        assert!(index.iter().all(|(_, entry)| entry.content_type.is_textual()));
    }

    #[tokio::test]
    async fn test_collision_keeps_last_scanned() {
        let corpus = tempfile::tempdir().unwrap();
        // Sorted by file name, directory "100" is walked before "200".
        write_descriptor(corpus.path(), 100, &rdf(100, "Poems", "Text"));
        write_descriptor(corpus.path(), 200, &rdf(200, "  POEMS ", "Text"));
        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(&normalize("poems")).map(|e| e.id), Some(200));
        assert_eq!(report.collisions, 1);
    }

    #[tokio::test]
    async fn test_concurrency_does_not_change_the_winner() {
        let corpus = tempfile::tempdir().unwrap();
        for id in 1..=40 {
            write_descriptor(corpus.path(), id, &rdf(id, "Collected Works", "Text"));
        }
        let sequential = BuildOptions { order: ScanOrder::Sorted, concurrency: 1 };
        let parallel = BuildOptions { order: ScanOrder::Sorted, concurrency: 16 };
        let (one, _) = CatalogIndex::build(corpus.path(), &sequential).await.unwrap();
        let (many, _) = CatalogIndex::build(corpus.path(), &parallel).await.unwrap();
        assert_eq!(one, many);
        // "9" sorts after "40" by file name.
        assert_eq!(many.find("collected works").map(|e| e.id), Some(9));
    }

    #[tokio::test]
    async fn test_non_descriptor_files_are_ignored() {
        let corpus = tempfile::tempdir().unwrap();
        write_descriptor(corpus.path(), 5, &rdf(5, "Walden", "Text"));
        fs::write(corpus.path().join("README.txt"), "not a descriptor").unwrap();
        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(report.discovered, 1);
        assert_eq!(report.skip_count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_walk_errors_below_root_are_skipped() {
        let corpus = tempfile::tempdir().unwrap();
        write_descriptor(corpus.path(), 5, &rdf(5, "Walden", "Text"));
        let looped = corpus.path().join("5").join("loop");
        std::os::unix::fs::symlink(corpus.path(), &looped).unwrap();

        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(report.discovered, 1);
        assert_eq!(report.skip_count(), 1);
        assert_eq!(report.skipped[0].path, looped);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_descriptor_path_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let corpus = tempfile::tempdir().unwrap();
        write_descriptor(corpus.path(), 5, &rdf(5, "Walden", "Text"));
        let dir = corpus.path().join(OsStr::from_bytes(b"\xff"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("pg7.rdf"), rdf(7, "Beowulf", "Text")).unwrap();

        let (index, report) = CatalogIndex::build(corpus.path(), &sorted()).await.unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(index.len(), 1);
        assert!(index.find("beowulf").is_none());
        assert_eq!(report.skip_count(), 1);
        assert!(report.skipped[0].reason.contains("UTF-8"));
    }

    #[tokio::test]
    async fn test_missing_corpus_is_an_error() {
        let corpus = tempfile::tempdir().unwrap();
        let missing = corpus.path().join("nope");
        let err = CatalogIndex::build(&missing, &sorted()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::CorpusUnavailable(missing));
    }

    #[tokio::test]
    async fn test_empty_corpus_builds_empty_index() {
        let corpus = tempfile::tempdir().unwrap();
        let (index, report) = CatalogIndex::build(corpus.path(), &BuildOptions::default()).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(report, BuildReport { elapsed: report.elapsed, ..BuildReport::default() });
    }
}
