//! Configuration loading and validation for folio.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file (TOML, YAML or JSON, picked by extension); the
//!    per-user file from [`Config::default_path`] is used when no file is
//!    given explicitly and it exists,
//! 3. `FOLIO_*` environment variables (`FOLIO_CORPUS_DIR`, `FOLIO_MIRROR`, ...).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use folio_catalog::{BuildOptions, DEFAULT_CONCURRENCY, ScanOrder};
use folio_mirror::{DEFAULT_MIRROR_BASE, Mirror};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FOLIO_";
/// Robot-friendly location of the full RDF catalog.
pub const DEFAULT_CATALOG_ARCHIVE: &str = "http://gutenberg.pglaf.org/cache/generated/feeds/rdf-files.tar.zip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree of `*.rdf` descriptors.
    pub corpus_dir: PathBuf,
    /// Where the index snapshot is saved and loaded.
    pub snapshot: PathBuf,
    /// Base URL of the distribution mirror.
    pub mirror: String,
    /// Where to fetch the catalog archive from when the corpus is missing.
    pub catalog_archive: String,
    /// Where downloaded books end up.
    pub download_dir: PathBuf,
    /// Descriptors parsed concurrently during an index build.
    pub concurrency: usize,
    pub scan_order: ScanOrder,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("cache/epub"),
            snapshot: PathBuf::from("titles.jsonl"),
            mirror: DEFAULT_MIRROR_BASE.to_string(),
            catalog_archive: DEFAULT_CATALOG_ARCHIVE.to_string(),
            download_dir: PathBuf::from("."),
            concurrency: DEFAULT_CONCURRENCY,
            scan_order: ScanOrder::default(),
        }
    }
}

impl Config {
    /// Per-user configuration file, e.g. `~/.config/folio/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "folio").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads and validates the layered configuration.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let figment = Self::figment(file)?;
        let config: Config = figment.extract().map_err(|err| ErrorKind::Load(err.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// The merged configuration sources, before extraction.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match file {
            Some(file) => Some(file.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        if let Some(file) = file {
            if !file.is_file() {
                exn::bail!(ErrorKind::MissingFile(file));
            }
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&file)),
                Some("json") => figment.merge(Json::file(&file)),
                _ => exn::bail!(ErrorKind::UnsupportedFile(file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "concurrency",
                reason: "must be at least 1",
            });
        }
        if self.mirror.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "mirror",
                reason: "must not be empty",
            });
        }
        if self.snapshot.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "snapshot",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            order: self.scan_order,
            concurrency: self.concurrency,
        }
    }

    pub fn mirror(&self) -> Mirror {
        Mirror::new(self.mirror.as_str())
    }
}
