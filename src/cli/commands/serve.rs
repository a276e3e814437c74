//! Serve command - run the bundling server

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::BundleResult;
use crate::server;
use tracing::debug;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> BundleResult<()> {
    let mut config = config.clone();
    apply_overrides(&mut config, args);
    debug!(?config, "effective configuration");

    server::run(&config).await
}

/// Command-line and environment values win over the config file
fn apply_overrides(config: &mut Config, args: ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(dir) = args.cache_dir {
        config.cache.dir = dir;
    }
    if let Some(dir) = args.manifest_dir {
        config.workspace.manifest_dir = dir;
    }
    if args.workers.is_some() {
        config.server.workers = args.workers;
    }
}
