//! External build tools
//!
//! Dependency discovery, package installation and bundling are each behind
//! a trait so the pipeline does not care which binaries back them:
//! - Discovery: `bunx depcheck`
//! - Installation: `bun install`
//! - Bundling: `esbuild`

mod bun;
mod depcheck;
mod esbuild;
mod factory;
mod tool;

pub use bun::BunInstaller;
pub use depcheck::Depcheck;
pub use esbuild::Esbuild;
pub use factory::Toolchain;
pub use tool::{Bundler, DependencyDiscovery, MissingDependencies, PackageInstaller};

use crate::error::{BundleError, BundleResult, Stage};
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Lines of tool output kept in an error
const FAILURE_TAIL_LINES: usize = 50;

/// Diagnostic text for a failed tool run: the last lines of stdout then stderr
pub(crate) fn failure_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    tail_lines(&stdout, &stderr)
}

fn tail_lines(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let skip = lines.len().saturating_sub(FAILURE_TAIL_LINES);
    lines[skip..].join("\n")
}

/// Run `command` followed by `args` inside `dir`, capturing output
///
/// A nonzero exit is not an error here; callers decide what a status means.
pub(crate) async fn run_tool(
    stage: Stage,
    command: &[String],
    args: &[String],
    dir: &Path,
) -> BundleResult<Output> {
    let cmdline = command.join(" ");
    let Some((program, prefix)) = command.split_first() else {
        return Err(BundleError::tool_spawn(
            stage,
            "<empty command>",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no program configured"),
        ));
    };

    debug!("Executing in {}: {} {:?}", dir.display(), cmdline, args);

    Command::new(program)
        .args(prefix)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| BundleError::tool_spawn(stage, cmdline, e))
}

/// Check whether a tool's program starts at all
pub async fn probe(command: &[String]) -> bool {
    let Some(program) = command.first() else {
        return false;
    };

    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
