//! Shared fixtures for unit tests

use crate::cache::BundleCache;
use crate::config::schema::{FetchConfig, WorkspaceConfig};
use crate::error::{BundleError, BundleResult};
use crate::fetch::Fetcher;
use crate::pipeline::Pipeline;
use crate::toolchain::{
    Bundler, DependencyDiscovery, MissingDependencies, PackageInstaller, Toolchain,
};
use crate::workspace::Workspace;
use actix_web::http::header;
use actix_web::{web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Tool command running `script` through `sh -c`; appended args become `$1..`
pub fn sh(script: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        "tool".to_string(),
    ]
}

/// Directory holding the three base manifest files
pub fn manifest_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name":"base"}"#).unwrap();
    std::fs::write(dir.path().join("bun.lock"), "{}").unwrap();
    std::fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
    dir
}

/// Workspace config reading manifests from `manifests`
pub fn workspace_config(manifests: &TempDir) -> WorkspaceConfig {
    WorkspaceConfig {
        manifest_dir: manifests.path().to_path_buf(),
        ..WorkspaceConfig::default()
    }
}

/// Workspace with `source` as entry; keep the returned manifest dir alive
pub async fn workspace_with(source: &[u8]) -> (TempDir, Workspace) {
    let manifests = manifest_dir();
    let ws = Workspace::create(&workspace_config(&manifests), source)
        .await
        .unwrap();
    (manifests, ws)
}

fn redirect(status: actix_web::http::StatusCode, to: &'static str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((header::LOCATION, to))
        .finish()
}

/// Start a local upstream serving source modules; returns its base URL
///
/// Routes: `/a.ts` 301 -> `/b.ts` 302 -> `/c.ts` 200, `/loop.ts` redirects to
/// itself, `/permanent.ts` 308 -> `/c.ts`, `/missing.ts` 404,
/// `/no-location.ts` 302 without `Location`,
/// `/broken.ts` serves a syntax error.
pub async fn spawn_upstream() -> String {
    use actix_web::http::StatusCode;

    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/a.ts",
                web::get().to(|| async { redirect(StatusCode::MOVED_PERMANENTLY, "/b.ts") }),
            )
            .route(
                "/b.ts",
                web::get().to(|| async { redirect(StatusCode::FOUND, "c.ts") }),
            )
            .route(
                "/c.ts",
                web::get().to(|| async { HttpResponse::Ok().body("export const c = 1;") }),
            )
            .route(
                "/loop.ts",
                web::get().to(|| async { redirect(StatusCode::TEMPORARY_REDIRECT, "/loop.ts") }),
            )
            .route(
                "/permanent.ts",
                web::get().to(|| async { redirect(StatusCode::PERMANENT_REDIRECT, "/c.ts") }),
            )
            .route(
                "/missing.ts",
                web::get().to(|| async { HttpResponse::NotFound().body("no such module") }),
            )
            .route(
                "/no-location.ts",
                web::get().to(|| async { HttpResponse::Found().finish() }),
            )
            .route(
                "/broken.ts",
                web::get().to(|| async { HttpResponse::Ok().body("export const = ;") }),
            )
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

/// Reports a fixed set of missing packages
pub struct ScriptedDiscovery {
    pub missing: Vec<&'static str>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl DependencyDiscovery for ScriptedDiscovery {
    async fn discover(&self, _workspace: &Workspace) -> BundleResult<MissingDependencies> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut deps = MissingDependencies::default();
        for name in &self.missing {
            deps.missing
                .insert(name.to_string(), vec!["src/index.ts".to_string()]);
        }
        Ok(deps)
    }
}

/// Records the packages it was asked to install
#[derive(Default)]
pub struct RecordingInstaller {
    pub installs: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    async fn install(&self, _workspace: &Workspace, packages: &[String]) -> BundleResult<()> {
        self.installs.lock().unwrap().push(packages.to_vec());
        Ok(())
    }
}

/// Entry source the fake bundler rejects
pub const BROKEN_SOURCE: &[u8] = b"export const = ;";

/// "Bundles" by echoing the entry file; rejects [`BROKEN_SOURCE`]
#[derive(Default)]
pub struct EchoBundler {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Bundler for EchoBundler {
    async fn bundle(&self, workspace: &Workspace) -> BundleResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let source = tokio::fs::read(workspace.entry_path()).await.unwrap();
        if source == BROKEN_SOURCE {
            return Err(BundleError::Build {
                errors: "src/index.ts:1:13: ERROR: Expected identifier but found \"=\"".to_string(),
            });
        }
        Ok(source)
    }
}

/// Pipeline wired to fakes, a temp cache and a local upstream
pub struct Harness {
    pub pipeline: Arc<Pipeline>,
    pub discovery: Arc<ScriptedDiscovery>,
    pub installer: Arc<RecordingInstaller>,
    pub bundler: Arc<EchoBundler>,
    /// Base URL of the local upstream
    pub base: String,
    _cache_dir: TempDir,
    _manifests: TempDir,
}

impl Harness {
    pub async fn new(missing: Vec<&'static str>) -> Self {
        let base = spawn_upstream().await;
        let cache_dir = TempDir::new().unwrap();
        let manifests = manifest_dir();
        let discovery = Arc::new(ScriptedDiscovery {
            missing,
            calls: AtomicUsize::new(0),
        });
        let installer = Arc::new(RecordingInstaller::default());
        let bundler = Arc::new(EchoBundler::default());
        let toolchain = Toolchain {
            discovery: discovery.clone(),
            installer: installer.clone(),
            bundler: bundler.clone(),
        };
        let pipeline = Arc::new(Pipeline::new(
            Fetcher::new(&FetchConfig::default()).unwrap(),
            BundleCache::open(cache_dir.path()).await.unwrap(),
            workspace_config(&manifests),
            toolchain,
            20,
        ));
        Self {
            pipeline,
            discovery,
            installer,
            bundler,
            base,
            _cache_dir: cache_dir,
            _manifests: manifests,
        }
    }

    pub fn bundle_calls(&self) -> usize {
        self.bundler.calls.load(Ordering::SeqCst)
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery.calls.load(Ordering::SeqCst)
    }
}
