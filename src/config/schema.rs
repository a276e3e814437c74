//! Configuration schema for tsbundle
//!
//! Configuration is stored at `~/.config/tsbundle/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Bundle cache settings
    pub cache: CacheConfig,

    /// Per-build workspace layout
    pub workspace: WorkspaceConfig,

    /// Upstream fetch settings
    pub fetch: FetchConfig,

    /// External tool commands
    pub tools: ToolsConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on (the `PORT` environment variable takes precedence)
    pub port: u16,

    /// Seconds in-flight requests get to finish after a termination signal
    pub shutdown_timeout_secs: u64,

    /// Worker thread count (defaults to the number of CPUs)
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout_secs: 10,
            workers: None,
        }
    }
}

/// Bundle cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding bundled artifacts, one file per key
    pub dir: PathBuf,

    /// Number of hex characters kept from the URL digest
    pub key_length: usize,

    /// Number of digest bytes used for the ETag
    pub etag_bytes: usize,

    /// `max-age` sent with every served bundle
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cache"),
            key_length: 20,
            etag_bytes: 16,
            max_age_secs: 31_536_000,
        }
    }
}

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory the base manifest files are copied from
    pub manifest_dir: PathBuf,

    /// Manifest files copied into every workspace
    pub manifest_files: Vec<String>,

    /// Entry file path, relative to the workspace root
    pub entry_file: PathBuf,

    /// Bundle output path, relative to the workspace root
    pub output_file: PathBuf,

    /// Prefix for workspace directory names
    pub temp_prefix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("."),
            manifest_files: vec![
                "package.json".to_string(),
                "bun.lock".to_string(),
                "tsconfig.json".to_string(),
            ],
            entry_file: PathBuf::from("src/index.ts"),
            output_file: PathBuf::from("dist/bundle.js"),
            temp_prefix: "tsbundle-build-".to_string(),
        }
    }
}

/// Upstream fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum redirect hops before giving up
    pub max_redirects: usize,

    /// Per-hop request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            timeout_secs: 30,
        }
    }
}

/// External tool configuration
///
/// Each command is an argv prefix; the pipeline appends its own arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Dependency discovery command
    pub discovery: Vec<String>,

    /// Exit code the discovery tool uses for "ran fine, found issues"
    pub discovery_findings_exit_code: i32,

    /// Package installer command
    pub installer: Vec<String>,

    /// Bundler command
    pub bundler: Vec<String>,

    /// JavaScript language target passed to the bundler
    pub target: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            discovery: vec!["bunx".to_string(), "depcheck".to_string()],
            discovery_findings_exit_code: 255,
            installer: vec!["bun".to_string()],
            bundler: vec!["bunx".to_string(), "esbuild".to_string()],
            target: "es2015".to_string(),
        }
    }
}
