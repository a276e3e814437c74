//! Request-to-artifact pipeline
//!
//! Fetch -> redirect check -> cache check -> (miss) workspace -> discovery ->
//! install -> bundle -> cache write. Stages run sequentially; any failure ends
//! the request without retry, and nothing is cached for a failed build.

mod inflight;

pub use inflight::InFlight;

use crate::cache::{BundleCache, CacheKey};
use crate::config::schema::WorkspaceConfig;
use crate::config::Config;
use crate::error::BundleResult;
use crate::fetch::Fetcher;
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;
use std::time::Instant;
use tracing::{debug, info};

/// Result of resolving a requested URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The URL redirected; the client should request the canonical URL instead
    Redirect { canonical_url: String },
    /// The bundle is cached under `key`
    Ready { key: CacheKey, cache_hit: bool },
}

/// Composes fetcher, cache, workspace and toolchain
pub struct Pipeline {
    fetcher: Fetcher,
    cache: BundleCache,
    workspace: WorkspaceConfig,
    toolchain: Toolchain,
    key_length: usize,
    inflight: InFlight,
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        cache: BundleCache,
        workspace: WorkspaceConfig,
        toolchain: Toolchain,
        key_length: usize,
    ) -> Self {
        Self {
            fetcher,
            cache,
            workspace,
            toolchain,
            key_length,
            inflight: InFlight::new(),
        }
    }

    /// Build a pipeline from configuration, opening the cache directory
    pub async fn from_config(config: &Config) -> BundleResult<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let cache = BundleCache::open(&config.cache.dir).await?;
        let toolchain = Toolchain::from_config(&config.tools);
        Ok(Self::new(
            fetcher,
            cache,
            config.workspace.clone(),
            toolchain,
            config.cache.key_length,
        ))
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    /// Resolve `url` to a cached bundle, building it on a miss
    pub async fn resolve(&self, url: &str) -> BundleResult<Outcome> {
        let start = Instant::now();
        info!(url, "starting bundle process");

        let source = self.fetcher.fetch(url).await?;
        if !source.is_canonical() {
            debug!("{} canonicalizes to {}", url, source.canonical_url);
            return Ok(Outcome::Redirect {
                canonical_url: source.canonical_url,
            });
        }

        let key = CacheKey::for_url(&source.canonical_url, self.key_length);
        if self.cache.exists(&key).await {
            info!(hash = %key, duration = ?start.elapsed(), "cache hit");
            return Ok(Outcome::Ready {
                key,
                cache_hit: true,
            });
        }
        info!(hash = %key, duration = ?start.elapsed(), "cache miss");

        self.inflight
            .run(&key, || self.build(&key, &source.body, start))
            .await?;

        Ok(Outcome::Ready {
            key,
            cache_hit: false,
        })
    }

    async fn build(&self, key: &CacheKey, source: &[u8], start: Instant) -> BundleResult<()> {
        // A build for this key may have finished between the cache check and here
        if self.cache.exists(key).await {
            debug!("{} cached by a concurrent build", key);
            return Ok(());
        }

        let workspace = Workspace::create(&self.workspace, source).await?;

        info!(duration = ?start.elapsed(), "running dependency check");
        let missing = self.toolchain.discovery.discover(&workspace).await?;
        self.toolchain
            .installer
            .install(&workspace, &missing.package_names())
            .await?;
        info!(
            missing_count = missing.len(),
            duration = ?start.elapsed(),
            "installed dependencies"
        );

        let bundle = self.toolchain.bundler.bundle(&workspace).await?;
        info!(duration = ?start.elapsed(), "build completed");

        let size = bundle.len();
        self.cache.write(key, bundle).await?;
        info!(size, total_duration = ?start.elapsed(), "bundle cached and ready to serve");
        Ok(())
    }
}
