//! Durable snapshots of a [`CatalogIndex`].
//!
//! Snapshots are JSON Lines: one header record followed by one record per
//! entry, sorted by key so that two snapshots of the same corpus diff cleanly.
//!
//! ```text
//! {"format":"folio-catalog","version":1,"generated_at":"2026-10-18T09:12:44Z","entries":2}
//! {"key":"emma","id":158,"title":"Emma","content_type":"Text","descriptor":"cache/epub/158/pg158.rdf"}
//! {"key":"moby dick; or, the whale","id":2701,"title":"Moby Dick; Or, The Whale","content_type":"Text","descriptor":"cache/epub/2701/pg2701.rdf"}
//! ```
//!
//! A snapshot is never checked against the corpus it came from. After the
//! corpus changes, delete the snapshot to force a rebuild.

use crate::error::{ErrorKind, Result};
use crate::index::{CatalogIndex, Insertion};
use crate::normalize::normalize;
use exn::{OptionExt, ResultExt};
use folio_extract::models::{CatalogEntry, ContentType};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::instrument;

const FORMAT: &str = "folio-catalog";
const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    version: u32,
    #[serde(with = "time::serde::rfc3339")]
    generated_at: OffsetDateTime,
    entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    key: String,
    id: u64,
    title: String,
    content_type: String,
    descriptor: PathBuf,
}
impl Record {
    fn into_entry(self, line: usize) -> Result<CatalogEntry> {
        if normalize(&self.title).as_str() != self.key {
            exn::bail!(ErrorKind::IndexCorrupt(format!("line {line}: key does not match title")));
        }
        Ok(CatalogEntry {
            id: self.id,
            title: self.title,
            content_type: ContentType::from(self.content_type.as_str()),
            descriptor: self.descriptor,
        })
    }
}
impl From<(&str, &CatalogEntry)> for Record {
    fn from((key, entry): (&str, &CatalogEntry)) -> Self {
        Self {
            key: key.to_string(),
            id: entry.id,
            title: entry.title.clone(),
            content_type: entry.content_type.to_string(),
            descriptor: entry.descriptor.clone(),
        }
    }
}

impl CatalogIndex {
    /// Writes the index to `destination`.
    ///
    /// The snapshot is written next to the destination first and renamed into
    /// place, so an interrupted save never leaves a truncated snapshot behind.
    /// Entries whose descriptor path is not valid UTF-8 cannot be represented
    /// in JSON; they are left out with a warning and the number written is
    /// returned.
    #[instrument(skip(self, destination), fields(destination = %destination.as_ref().display(), entries = self.len()))]
    pub fn save(&self, destination: impl AsRef<Path>) -> Result<usize> {
        let destination = destination.as_ref();
        let staging = staging_path(destination);
        let written = self
            .write_to(&staging)
            .and_then(|written| fs::rename(&staging, destination).map(|()| written))
            .or_raise(|| ErrorKind::SnapshotWrite(destination.to_path_buf()));
        if written.is_err()
            && staging.exists()
            && let Err(err) = fs::remove_file(&staging)
        {
            tracing::debug!(staging = %staging.display(), %err, "Could not remove staging snapshot");
        }
        let written = written?;
        tracing::info!(written, "Saved catalog snapshot");
        Ok(written)
    }

    fn write_to(&self, path: &Path) -> std::io::Result<usize> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut entries: Vec<_> = self
            .iter()
            .filter(|(_, entry)| {
                let representable = entry.descriptor.to_str().is_some();
                if !representable {
                    tracing::warn!(id = entry.id, descriptor = %entry.descriptor.display(), "Descriptor path is not valid UTF-8; leaving entry out of snapshot");
                }
                representable
            })
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut writer = BufWriter::new(File::create(path)?);
        let header = Header {
            format: FORMAT.to_string(),
            version: VERSION,
            generated_at: OffsetDateTime::now_utc(),
            entries: entries.len(),
        };
        serde_json::to_writer(&mut writer, &header)?;
        writeln!(writer)?;
        for (key, entry) in &entries {
            serde_json::to_writer(&mut writer, &Record::from((key.as_str(), *entry)))?;
            writeln!(writer)?;
        }
        writer.into_inner().map_err(|err| err.into_error())?.sync_all()?;
        Ok(entries.len())
    }

    /// Reads an index back from a snapshot written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::SnapshotMissing`] if there is no file at `source`
    /// - [`ErrorKind::IndexCorrupt`] if the file cannot be parsed, its header
    ///   is unknown, a record breaks an index invariant, or the record count
    ///   disagrees with the header
    ///
    /// Both mean the caller should fall back to
    /// [`build`](CatalogIndex::build).
    #[instrument(skip(source), fields(source = %source.as_ref().display()))]
    pub fn load(source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        let file = match File::open(source) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::SnapshotMissing(source.to_path_buf()));
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::IndexCorrupt("unreadable snapshot".to_string())),
        };
        let mut lines = BufReader::new(file).lines();
        let header: Header = lines
            .next()
            .ok_or_raise(|| ErrorKind::IndexCorrupt("empty snapshot".to_string()))?
            .or_raise(|| ErrorKind::IndexCorrupt("unreadable header".to_string()))
            .and_then(|line| {
                serde_json::from_str(&line).or_raise(|| ErrorKind::IndexCorrupt("line 1: invalid header".to_string()))
            })?;
        if header.format != FORMAT || header.version != VERSION {
            exn::bail!(ErrorKind::IndexCorrupt(format!(
                "unsupported snapshot format {} v{}",
                header.format, header.version
            )));
        }

        let mut index = CatalogIndex::new();
        let mut records = 0usize;
        for (offset, line) in lines.enumerate() {
            let number = offset + 2;
            let line = line.or_raise(|| ErrorKind::IndexCorrupt(format!("line {number}: unreadable")))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&line)
                .or_raise(|| ErrorKind::IndexCorrupt(format!("line {number}: invalid record")))?;
            records += 1;
            match index.insert(record.into_entry(number)?) {
                Insertion::Inserted => {},
                Insertion::Replaced(_) => {
                    exn::bail!(ErrorKind::IndexCorrupt(format!("line {number}: duplicate key")));
                },
                Insertion::NotTextual => {
                    exn::bail!(ErrorKind::IndexCorrupt(format!("line {number}: entry is not a textual work")));
                },
            }
        }
        if records != header.entries {
            exn::bail!(ErrorKind::IndexCorrupt(format!(
                "expected {} records, found {records}",
                header.entries
            )));
        }
        tracing::info!(entries = records, generated_at = %header.generated_at, "Loaded catalog snapshot");
        Ok(index)
    }
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    destination.with_file_name(name)
}
