//! Load-or-build bootstrap of a [`Resolver`].

use crate::error::{ErrorKind, Result};
use crate::resolve::Resolver;
use exn::ResultExt;
use folio_catalog::{BuildReport, CatalogIndex};
use folio_config::Config;
use tracing::instrument;

/// Where the resolver's index came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOrigin {
    /// Loaded from the configured snapshot.
    Snapshot,
    /// Built from the corpus, then saved as the new snapshot.
    Built(BuildReport),
}

#[derive(Debug)]
pub struct Opened {
    pub resolver: Resolver,
    pub origin: IndexOrigin,
}
impl Opened {
    /// Number of titles the resolver knows about.
    pub fn titles(&self) -> usize {
        self.resolver.index().len()
    }
}

/// Opens a resolver for `config`.
///
/// The snapshot is used when it loads cleanly. A missing or corrupt snapshot,
/// or `rebuild`, means a full build of the corpus, which then replaces the
/// snapshot. Failing to write the new snapshot only costs the next run a
/// rebuild; the freshly built index is still returned.
#[instrument(skip(config), fields(snapshot = %config.snapshot.display(), corpus = %config.corpus_dir.display()))]
pub async fn open(config: &Config, rebuild: bool) -> Result<Opened> {
    let mirror = config.mirror();
    if !rebuild {
        match CatalogIndex::load(&config.snapshot) {
            Ok(index) => {
                return Ok(Opened {
                    resolver: Resolver::new(index, mirror),
                    origin: IndexOrigin::Snapshot,
                });
            },
            Err(err) if err.requires_rebuild() => {
                let reason: &folio_catalog::error::ErrorKind = &err;
                tracing::warn!(%reason, "Snapshot unusable, rebuilding index");
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Catalog),
        }
    }

    let (index, report) = CatalogIndex::build(&config.corpus_dir, &config.build_options())
        .await
        .or_raise(|| ErrorKind::Catalog)?;
    if let Err(err) = index.save(&config.snapshot) {
        let reason: &folio_catalog::error::ErrorKind = &err;
        tracing::warn!(%reason, "Could not save snapshot, continuing with the built index");
    }
    Ok(Opened {
        resolver: Resolver::new(index, mirror),
        origin: IndexOrigin::Built(report),
    })
}
