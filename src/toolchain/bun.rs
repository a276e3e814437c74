//! Package installation via `bun install`

use crate::error::{BundleError, BundleResult, Stage};
use crate::toolchain::tool::PackageInstaller;
use crate::toolchain::{failure_output, run_tool};
use crate::workspace::Workspace;
use async_trait::async_trait;
use tracing::info;

/// Installer backed by `bun install [--save <pkg>...]`
pub struct BunInstaller {
    command: Vec<String>,
}

impl BunInstaller {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn install_args(packages: &[String]) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        if !packages.is_empty() {
            args.push("--save".to_string());
            args.extend(packages.iter().cloned());
        }
        args
    }
}

#[async_trait]
impl PackageInstaller for BunInstaller {
    async fn install(&self, workspace: &Workspace, packages: &[String]) -> BundleResult<()> {
        if !packages.is_empty() {
            info!("Installing {} missing packages: {}", packages.len(), packages.join(", "));
        }

        let args = Self::install_args(packages);
        let output = run_tool(Stage::Install, &self.command, &args, workspace.root()).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(BundleError::Install {
                output: failure_output(&output),
            })
        }
    }
}
