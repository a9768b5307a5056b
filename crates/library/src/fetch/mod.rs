//! Download and extraction capabilities.
//!
//! Nothing in folio talks to the network or unpacks archives itself. Callers
//! inject a [`Fetcher`] and an [`Archiver`], which keeps resolution testable
//! and lets front ends pick their own HTTP client.

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockArchiver, MockFetcher};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use folio_config::Config;
use folio_mirror::MirrorPath;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::instrument;

/// Retrieves a remote file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` into `target_dir`, returning the path of the local copy.
    ///
    /// The local file is named after the last segment of `url`.
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<PathBuf>;
}

/// Unpacks a catalog archive.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Extracts every member of `archive` below `destination`, keeping the
    /// archive's relative layout.
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Where the catalog archive keeps its descriptors, relative to the archive
/// root.
pub const ARCHIVE_CORPUS_DIR: &str = "cache/epub";

/// Outcome of [`prepare_corpus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preparation {
    /// The corpus directory already existed and was left untouched.
    AlreadyPresent,
    /// The catalog archive was fetched and its descriptors moved into place.
    Prepared { elapsed: Duration },
}

/// Makes sure `config.corpus_dir` exists, the same directory [`open`](crate::open)
/// indexes.
///
/// When it is missing, the catalog archive is fetched and extracted into a
/// staging directory next to it, and the archive's [`ARCHIVE_CORPUS_DIR`] is
/// then moved to `config.corpus_dir`. The staging directory, archive included,
/// is removed afterwards whether or not preparation succeeded.
#[instrument(skip_all, fields(corpus = %config.corpus_dir.display()))]
pub async fn prepare_corpus(config: &Config, fetcher: &dyn Fetcher, archiver: &dyn Archiver) -> Result<Preparation> {
    let corpus = config.corpus_dir.as_path();
    if corpus.is_dir() {
        tracing::debug!("Corpus already present");
        return Ok(Preparation::AlreadyPresent);
    }

    let start = Instant::now();
    let staging = staging_dir(corpus);
    tracing::info!(archive = %config.catalog_archive, staging = %staging.display(), "Corpus missing, fetching catalog archive");
    let prepared = unpack(config, fetcher, archiver, &staging).await;
    if staging.exists()
        && let Err(err) = tokio::fs::remove_dir_all(&staging).await
    {
        tracing::warn!(staging = %staging.display(), %err, "Could not remove staging directory");
    }
    prepared?;

    let elapsed = start.elapsed();
    tracing::info!(elapsed_ms = elapsed.as_millis(), "Corpus prepared");
    Ok(Preparation::Prepared { elapsed })
}

async fn unpack(config: &Config, fetcher: &dyn Fetcher, archiver: &dyn Archiver, staging: &Path) -> Result<()> {
    let corpus = config.corpus_dir.as_path();
    if staging.exists() {
        tokio::fs::remove_dir_all(staging)
            .await
            .or_raise(|| ErrorKind::Corpus(corpus.to_path_buf()))?;
    }
    tokio::fs::create_dir_all(staging)
        .await
        .or_raise(|| ErrorKind::Corpus(corpus.to_path_buf()))?;

    let archive = fetcher.fetch(&config.catalog_archive, staging).await?;
    archiver
        .extract(&archive, staging)
        .await
        .or_raise(|| ErrorKind::Archive(archive.clone()))?;
    let extracted = staging.join(ARCHIVE_CORPUS_DIR);
    if !extracted.is_dir() {
        tracing::error!(archive = %archive.display(), "Archive did not contain {ARCHIVE_CORPUS_DIR}");
        exn::bail!(ErrorKind::Archive(archive));
    }
    tokio::fs::rename(&extracted, corpus)
        .await
        .or_raise(|| ErrorKind::Corpus(corpus.to_path_buf()))?;
    Ok(())
}

fn staging_dir(corpus: &Path) -> PathBuf {
    let mut name = corpus.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".partial");
    corpus.with_file_name(name)
}

/// Downloads the book at `path` into `target_dir`.
#[instrument(skip(fetcher, target_dir), fields(path = %path))]
pub async fn download(fetcher: &dyn Fetcher, path: &MirrorPath, target_dir: &Path) -> Result<PathBuf> {
    let local = fetcher
        .fetch(path.as_str(), target_dir)
        .await
        .or_raise(|| ErrorKind::Fetch(path.to_string()))?;
    tracing::info!(local = %local.display(), "Downloaded");
    Ok(local)
}

/// Downloads the book at `path` into the configured `download_dir`, creating
/// it if needed.
pub async fn download_book(config: &Config, fetcher: &dyn Fetcher, path: &MirrorPath) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .or_raise(|| ErrorKind::Fetch(path.to_string()))?;
    download(fetcher, path, &config.download_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::rdf;
    use folio_mirror::{FormatTag, Mirror};

    fn config(root: &Path) -> Config {
        Config {
            corpus_dir: root.join("library").join("epub"),
            snapshot: root.join("titles.jsonl"),
            download_dir: root.join("books"),
            ..Config::default()
        }
    }

    fn catalog_archive(config: &Config) -> MockFetcher {
        MockFetcher::with_files([(config.catalog_archive.clone(), b"PK".to_vec())])
    }

    #[tokio::test]
    async fn test_prepare_moves_archive_corpus_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = catalog_archive(&config);
        let archiver = MockArchiver::with_members([
            ("cache/epub/2701/pg2701.rdf", b"<rdf:RDF/>".to_vec()),
            ("README", b"catalog".to_vec()),
        ]);

        let outcome = prepare_corpus(&config, &fetcher, &archiver).await.unwrap();
        assert!(matches!(outcome, Preparation::Prepared { .. }));
        assert!(config.corpus_dir.join("2701/pg2701.rdf").is_file());
        assert!(!staging_dir(&config.corpus_dir).exists());
        assert_eq!(fetcher.requests().await, vec![config.catalog_archive.clone()]);
        let extracted = archiver.extracted().await;
        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].starts_with(staging_dir(&config.corpus_dir)));
    }

    #[tokio::test]
    async fn test_prepared_corpus_is_the_one_opened() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let descriptor = rdf(2701, "Moby Dick", "Text", &["http://www.gutenberg.org/ebooks/2701.txt.utf-8"]);
        let archiver = MockArchiver::with_members([("cache/epub/2701/pg2701.rdf", descriptor.into_bytes())]);

        prepare_corpus(&config, &catalog_archive(&config), &archiver).await.unwrap();
        let opened = crate::open(&config, false).await.unwrap();
        assert_eq!(opened.resolver.resolve("moby dick").map(|entry| entry.id), Some(2701));
    }

    #[tokio::test]
    async fn test_prepare_leaves_existing_corpus_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        std::fs::create_dir_all(&config.corpus_dir).unwrap();
        let fetcher = MockFetcher::default();

        let outcome = prepare_corpus(&config, &fetcher, &MockArchiver::default()).await.unwrap();
        assert_eq!(outcome, Preparation::AlreadyPresent);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_prepare_rejects_archive_without_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let archiver = MockArchiver::with_members([("README", b"nothing here".to_vec())]);

        let err = prepare_corpus(&config, &catalog_archive(&config), &archiver).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Archive(_)));
        assert!(!config.corpus_dir.exists());
        assert!(!staging_dir(&config.corpus_dir).exists());
    }

    #[tokio::test]
    async fn test_prepare_surfaces_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let err = prepare_corpus(&config, &MockFetcher::default(), &MockArchiver::default())
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch(_)));
        assert!(err.is_retryable());
        assert!(!staging_dir(&config.corpus_dir).exists());
    }

    #[tokio::test]
    async fn test_download_hands_mirror_path_to_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = Mirror::default().locate(2701, FormatTag::Text).unwrap();
        let fetcher = MockFetcher::with_files([(path.to_string(), b"Call me Ishmael.".to_vec())]);

        let local = download(&fetcher, &path, dir.path()).await.unwrap();
        assert_eq!(local, dir.path().join("pg2701.txt.utf8"));
        assert_eq!(std::fs::read(&local).unwrap(), b"Call me Ishmael.");
    }

    #[tokio::test]
    async fn test_download_book_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let path = config.mirror().locate(2701, FormatTag::ReflowableImages).unwrap();
        let fetcher = MockFetcher::with_files([(path.to_string(), b"epub".to_vec())]);

        let local = download_book(&config, &fetcher, &path).await.unwrap();
        assert_eq!(local, config.download_dir.join("pg2701-images.epub"));
        assert!(local.is_file());
    }
}
