//! Error types for tsbundle
//!
//! All modules use `BundleResult<T>` as their return type. Every pipeline
//! failure is terminal for the request that hit it and is rendered to the
//! client as a script-shaped error response.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for tsbundle operations
pub type BundleResult<T> = Result<T, BundleError>;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Filesystem,
    Discovery,
    Install,
    Bundle,
    Cache,
    Startup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Filesystem => "filesystem",
            Self::Discovery => "discovery",
            Self::Install => "install",
            Self::Bundle => "bundle",
            Self::Cache => "cache",
            Self::Startup => "startup",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur in tsbundle
#[derive(Error, Debug)]
pub enum BundleError {
    // Fetch errors
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Too many redirects (limit {limit}) starting from {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("Upstream returned {status} for {url}: {body}")]
    Upstream {
        url: String,
        status: String,
        body: String,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Filesystem errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Tool errors
    #[error("Failed to start {command}: {source}")]
    ToolSpawn {
        stage: Stage,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Depcheck failed: {output}")]
    Discovery { output: String },

    #[error("Failed to parse depcheck output: {0}")]
    DiscoveryOutput(#[source] serde_json::Error),

    #[error("Install failed: {output}")]
    Install { output: String },

    #[error("Build failed: {errors}")]
    Build { errors: String },

    // Cache errors
    #[error("Failed to read from cache {key}: {source}")]
    CacheRead {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to cache {key}: {source}")]
    CacheWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    // Startup errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failure of a build this request awaited but did not run itself
    #[error(transparent)]
    Shared(Arc<BundleError>),
}

impl BundleError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a tool spawn error
    pub fn tool_spawn(stage: Stage, command: impl Into<String>, source: std::io::Error) -> Self {
        Self::ToolSpawn {
            stage,
            command: command.into(),
            source,
        }
    }

    /// Get the pipeline stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. }
            | Self::TooManyRedirects { .. }
            | Self::Upstream { .. }
            | Self::InvalidUrl { .. } => Stage::Fetch,
            Self::Io { .. } => Stage::Filesystem,
            Self::Discovery { .. } | Self::DiscoveryOutput(_) => Stage::Discovery,
            Self::Install { .. } => Stage::Install,
            Self::ToolSpawn { stage, .. } => *stage,
            Self::Build { .. } => Stage::Bundle,
            Self::CacheRead { .. } | Self::CacheWrite { .. } => Stage::Cache,
            Self::ConfigInvalid { .. }
            | Self::HttpClient(_)
            | Self::Bind { .. }
            | Self::TomlSerialize(_) => Stage::Startup,
            Self::Shared(inner) => inner.stage(),
        }
    }

    /// Short human-readable summary, shown as the first line of an error script
    pub fn summary(&self) -> String {
        match self {
            Self::Fetch { url, .. } => format!("Failed to fetch URL: {}", url),
            Self::TooManyRedirects { .. } => "Failed to follow redirect: too many redirects".into(),
            Self::Upstream { status, .. } => format!("Failed to fetch URL: {}", status),
            Self::InvalidUrl { url, .. } => format!("Invalid URL: {}", url),
            Self::Io { context, .. } => format!("Failed to {}", context),
            Self::ToolSpawn { command, .. } => format!("Failed to start {}", command),
            Self::Discovery { .. } | Self::DiscoveryOutput(_) => "Depcheck failed".into(),
            Self::Install { .. } => "bun install failed".into(),
            Self::Build { .. } => "Build failed".into(),
            Self::CacheRead { .. } => "Failed to read from cache".into(),
            Self::CacheWrite { .. } => "Failed to write to cache".into(),
            Self::Shared(inner) => inner.summary(),
            other => other.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolSpawn { .. } => Some("Install Bun from https://bun.sh and make sure it is on PATH"),
            Self::Bind { .. } => Some("Choose another port with --port or PORT"),
            Self::ConfigInvalid { .. } => Some("Run: tsbundle config show"),
            Self::Shared(inner) => inner.hint(),
            _ => None,
        }
    }
}
