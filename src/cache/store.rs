//! Disk-backed bundle store
//!
//! One flat file per key under the cache directory. Entries are never
//! evicted; a duplicate build overwriting a key writes identical bytes.

use crate::cache::key::CacheKey;
use crate::error::{BundleError, BundleResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Content-addressed store for bundled artifacts
#[derive(Debug, Clone)]
pub struct BundleCache {
    dir: PathBuf,
}

impl BundleCache {
    /// Open the cache, creating its directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> BundleResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| BundleError::io(format!("create cache directory {}", dir.display()), e))?;
        debug!("Using cache directory {}", dir.display());
        Ok(Self { dir })
    }

    /// Path of the entry for a key
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check whether an entry exists
    ///
    /// Errors other than "not found" count as a miss so the entry gets rebuilt.
    pub async fn exists(&self, key: &CacheKey) -> bool {
        match fs::metadata(self.path_for(key)).await {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Treating cache entry {} as missing: {}", key, e);
                false
            }
        }
    }

    /// Read an entry
    pub async fn read(&self, key: &CacheKey) -> BundleResult<Vec<u8>> {
        fs::read(self.path_for(key))
            .await
            .map_err(|source| BundleError::CacheRead {
                key: key.to_string(),
                source,
            })
    }

    /// Persist an entry
    ///
    /// Bytes are staged in a temporary file in the cache directory and renamed
    /// into place, so readers never see a partial entry.
    pub async fn write(&self, key: &CacheKey, content: Vec<u8>) -> BundleResult<()> {
        let dir = self.dir.clone();
        let target = self.path_for(key);
        let key_str = key.to_string();

        let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut staged = tempfile::Builder::new()
                .prefix(".staging-")
                .tempfile_in(&dir)?;
            staged.write_all(&content)?;
            staged.flush()?;
            staged.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|r| r);

        result.map_err(|source| BundleError::CacheWrite {
            key: key_str,
            source,
        })
    }
}
