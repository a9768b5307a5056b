//! In-memory capabilities for testing.

use super::{Archiver, Fetcher};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Serves files from memory and records every requested URL.
#[derive(Debug, Default)]
pub struct MockFetcher {
    files: HashMap<String, Vec<u8>>,
    requests: RwLock<Vec<String>>,
}

impl MockFetcher {
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<String>, Vec<u8>)>) -> Self {
        Self {
            files: files.into_iter().map(|(url, data)| (url.into(), data)).collect(),
            requests: RwLock::default(),
        }
    }

    /// URLs requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<PathBuf> {
        self.requests.write().await.push(url.to_string());
        let data = self.files.get(url).ok_or_raise(|| ErrorKind::Fetch(url.to_string()))?;
        let name = file_name(url).ok_or_raise(|| ErrorKind::Fetch(url.to_string()))?;
        let local = target_dir.join(name);
        tokio::fs::write(&local, data)
            .await
            .or_raise(|| ErrorKind::Fetch(url.to_string()))?;
        Ok(local)
    }
}

/// Pretends every archive holds the same fixed set of members.
#[derive(Debug, Default)]
pub struct MockArchiver {
    members: Vec<(PathBuf, Vec<u8>)>,
    extracted: RwLock<Vec<PathBuf>>,
}

impl MockArchiver {
    pub fn with_members(members: impl IntoIterator<Item = (impl Into<PathBuf>, Vec<u8>)>) -> Self {
        Self {
            members: members.into_iter().map(|(path, data)| (path.into(), data)).collect(),
            extracted: RwLock::default(),
        }
    }

    /// Archives extracted so far, in order.
    pub async fn extracted(&self) -> Vec<PathBuf> {
        self.extracted.read().await.clone()
    }
}

#[async_trait]
impl Archiver for MockArchiver {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        self.extracted.write().await.push(archive.to_path_buf());
        for (member, data) in &self.members {
            let target = destination.join(member);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .or_raise(|| ErrorKind::Archive(archive.to_path_buf()))?;
            }
            tokio::fs::write(&target, data)
                .await
                .or_raise(|| ErrorKind::Archive(archive.to_path_buf()))?;
        }
        Ok(())
    }
}

/// Last segment of a URL, used as the local file name.
fn file_name(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|name| !name.is_empty())
}
