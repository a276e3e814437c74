//! Tool abstractions
//!
//! Provides traits for the three external collaborators of a build so they
//! can be backed by different binaries (or fakes in tests).

use crate::error::BundleResult;
use crate::workspace::Workspace;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Packages referenced by the entry file but not declared in the manifest
///
/// Maps package name to the source locations that import it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MissingDependencies {
    #[serde(default)]
    pub missing: BTreeMap<String, Vec<String>>,
}

impl MissingDependencies {
    /// Package names to install, in sorted order
    pub fn package_names(&self) -> Vec<String> {
        self.missing.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Finds packages the entry file imports but the manifest does not declare
#[async_trait]
pub trait DependencyDiscovery: Send + Sync {
    async fn discover(&self, workspace: &Workspace) -> BundleResult<MissingDependencies>;
}

/// Installs packages into a workspace
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `packages`; an empty list installs the manifest's existing dependencies
    async fn install(&self, workspace: &Workspace, packages: &[String]) -> BundleResult<()>;
}

/// Bundles a workspace's entry file into a single ES module
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Build and return the bundled output
    async fn bundle(&self, workspace: &Workspace) -> BundleResult<Vec<u8>>;
}
