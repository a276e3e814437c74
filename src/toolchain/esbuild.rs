//! Bundling via the esbuild CLI
//!
//! Produces one minified ES module with a linked source map. The output file
//! is read back into memory whole; bundles are single-module sized.

use crate::error::{BundleError, BundleResult, Stage};
use crate::toolchain::tool::Bundler;
use crate::toolchain::{failure_output, run_tool};
use crate::workspace::Workspace;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

/// Bundler backed by `esbuild`
pub struct Esbuild {
    command: Vec<String>,
    target: String,
}

impl Esbuild {
    /// `target` is the JavaScript language level, e.g. `es2015`
    pub fn new(command: Vec<String>, target: impl Into<String>) -> Self {
        Self {
            command,
            target: target.into(),
        }
    }

    fn build_args(&self, workspace: &Workspace) -> Vec<String> {
        vec![
            workspace.entry_path().display().to_string(),
            "--bundle".to_string(),
            format!("--outfile={}", workspace.output_path().display()),
            format!("--target={}", self.target),
            "--format=esm".to_string(),
            "--sourcemap=linked".to_string(),
            "--minify-whitespace".to_string(),
            "--minify-identifiers".to_string(),
            "--minify-syntax".to_string(),
            "--log-level=error".to_string(),
        ]
    }
}

#[async_trait]
impl Bundler for Esbuild {
    async fn bundle(&self, workspace: &Workspace) -> BundleResult<Vec<u8>> {
        let args = self.build_args(workspace);
        let output = run_tool(Stage::Bundle, &self.command, &args, workspace.root()).await?;

        if !output.status.success() {
            return Err(BundleError::Build {
                errors: failure_output(&output),
            });
        }

        let out = workspace.output_path();
        let bundle = fs::read(&out)
            .await
            .map_err(|e| BundleError::io(format!("read {}", out.display()), e))?;
        debug!("Bundled {} bytes", bundle.len());
        Ok(bundle)
    }
}
