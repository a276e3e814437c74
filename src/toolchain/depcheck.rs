//! Dependency discovery via depcheck

use crate::error::{BundleError, BundleResult, Stage};
use crate::toolchain::tool::{DependencyDiscovery, MissingDependencies};
use crate::toolchain::{failure_output, run_tool};
use crate::workspace::Workspace;
use async_trait::async_trait;
use tracing::debug;

/// Discovery backed by `depcheck --json`
pub struct Depcheck {
    command: Vec<String>,
    findings_exit_code: i32,
}

impl Depcheck {
    /// `findings_exit_code` is the status depcheck uses for "ran fine, found issues"
    pub fn new(command: Vec<String>, findings_exit_code: i32) -> Self {
        Self {
            command,
            findings_exit_code,
        }
    }
}

#[async_trait]
impl DependencyDiscovery for Depcheck {
    async fn discover(&self, workspace: &Workspace) -> BundleResult<MissingDependencies> {
        let args = vec![
            "--json".to_string(),
            workspace.entry_file().display().to_string(),
        ];
        let output = run_tool(Stage::Discovery, &self.command, &args, workspace.root()).await?;

        let code = output.status.code();
        if !output.status.success() && code != Some(self.findings_exit_code) {
            return Err(BundleError::Discovery {
                output: failure_output(&output),
            });
        }

        let report: MissingDependencies =
            serde_json::from_slice(&output.stdout).map_err(BundleError::DiscoveryOutput)?;
        debug!("depcheck exited {:?}, {} missing", code, report.len());
        Ok(report)
    }
}
