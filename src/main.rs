//! tsbundle - On-demand TypeScript bundling proxy
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tsbundle::cli::{Cli, Commands};
use tsbundle::config::ConfigManager;
use tsbundle::error::BundleResult;

#[actix_web::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BundleResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    let json = match cli.log_format {
        Some(format) => format.as_str() == "json",
        None => config.general.log_format == "json",
    };
    init_logging(cli.verbose, json);

    match cli.into_command() {
        Commands::Serve(args) => tsbundle::cli::commands::serve(args, &config).await,
        Commands::Config(args) => tsbundle::cli::commands::config(args, &config, &manager).await,
    }
}

/// 0 = info, 1 = debug, 2+ = trace; `RUST_LOG` replaces the default filter
fn init_logging(verbose: u8, json: bool) {
    let default = match verbose {
        0 => "tsbundle=info,actix_server=warn",
        1 => "tsbundle=debug,actix_server=info",
        _ => "tsbundle=trace,actix_web=debug,actix_server=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
