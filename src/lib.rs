//! tsbundle - On-demand TypeScript bundling proxy
//!
//! Fetches a TypeScript module from any URL, installs the packages it
//! imports, bundles it with esbuild and serves the result from a
//! content-addressed disk cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod server;
pub mod toolchain;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use error::{BundleError, BundleResult};
