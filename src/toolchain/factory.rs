//! Toolchain construction from configuration

use crate::config::schema::ToolsConfig;
use crate::toolchain::bun::BunInstaller;
use crate::toolchain::depcheck::Depcheck;
use crate::toolchain::esbuild::Esbuild;
use crate::toolchain::probe;
use crate::toolchain::tool::{Bundler, DependencyDiscovery, PackageInstaller};
use std::sync::Arc;
use tracing::warn;

/// The three collaborators a build needs
#[derive(Clone)]
pub struct Toolchain {
    pub discovery: Arc<dyn DependencyDiscovery>,
    pub installer: Arc<dyn PackageInstaller>,
    pub bundler: Arc<dyn Bundler>,
}

impl Toolchain {
    /// Create the depcheck/bun/esbuild toolchain described by `config`
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            discovery: Arc::new(Depcheck::new(
                config.discovery.clone(),
                config.discovery_findings_exit_code,
            )),
            installer: Arc::new(BunInstaller::new(config.installer.clone())),
            bundler: Arc::new(Esbuild::new(config.bundler.clone(), config.target.clone())),
        }
    }

    /// Warn about configured tools whose program does not start
    ///
    /// Returns the commands that failed the probe.
    pub async fn check_available(config: &ToolsConfig) -> Vec<String> {
        let mut missing = Vec::new();
        for command in [&config.discovery, &config.installer, &config.bundler] {
            if !probe(command).await {
                let cmdline = command.join(" ");
                warn!("Tool not available: {} (builds will fail until it is installed)", cmdline);
                missing.push(cmdline);
            }
        }
        missing
    }
}
