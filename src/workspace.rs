//! Per-build workspace directories
//!
//! Each build gets a fresh temporary directory holding copies of the base
//! manifest files plus the fetched source as the single entry file. The
//! shared manifests are only ever read; installs touch the copies.

use crate::config::schema::WorkspaceConfig;
use crate::error::{BundleError, BundleResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tracing::debug;

/// Isolated project directory for one build attempt
///
/// The directory is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    entry_file: PathBuf,
    output_file: PathBuf,
}

impl Workspace {
    /// Materialize a workspace containing the manifests and `source` as entry
    pub async fn create(config: &WorkspaceConfig, source: &[u8]) -> BundleResult<Self> {
        let prefix = config.temp_prefix.clone();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir()
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|r| r)
        .map_err(|e| BundleError::io("create temp dir", e))?;
        debug!("Created workspace {}", dir.path().display());

        for file in &config.manifest_files {
            let from = config.manifest_dir.join(file);
            let content = fs::read(&from)
                .await
                .map_err(|e| BundleError::io(format!("read {}", file), e))?;
            fs::write(dir.path().join(file), content)
                .await
                .map_err(|e| BundleError::io(format!("write {}", file), e))?;
        }

        let entry = dir.path().join(&config.entry_file);
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BundleError::io(format!("create {}", parent.display()), e))?;
        }
        fs::write(&entry, source)
            .await
            .map_err(|e| BundleError::io(format!("write {}", config.entry_file.display()), e))?;

        Ok(Self {
            dir,
            entry_file: config.entry_file.clone(),
            output_file: config.output_file.clone(),
        })
    }

    /// Workspace root directory
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Entry file path relative to the root
    pub fn entry_file(&self) -> &Path {
        &self.entry_file
    }

    /// Absolute path of the entry file
    pub fn entry_path(&self) -> PathBuf {
        self.root().join(&self.entry_file)
    }

    /// Absolute path the bundler writes its output to
    pub fn output_path(&self) -> PathBuf {
        self.root().join(&self.output_file)
    }
}
