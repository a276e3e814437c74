//! End-to-end builds through the real depcheck, bun and esbuild binaries
//!
//! These need Bun on PATH and npm registry access, so they are ignored by
//! default. Run with `cargo test -- --ignored`.

use actix_web::{web, App, HttpResponse, HttpServer};
use std::collections::HashMap;
use tempfile::TempDir;
use tsbundle::cache::{BundleCache, CacheKey};
use tsbundle::config::schema::{FetchConfig, ToolsConfig, WorkspaceConfig};
use tsbundle::error::Stage;
use tsbundle::fetch::Fetcher;
use tsbundle::pipeline::{Outcome, Pipeline};
use tsbundle::toolchain::Toolchain;

/// Serve `modules` by name from a local upstream; returns its base URL
async fn serve_modules(modules: &[(&str, &'static str)]) -> String {
    let modules: HashMap<String, &'static str> = modules
        .iter()
        .map(|(name, source)| (name.to_string(), *source))
        .collect();
    let modules = web::Data::new(modules);

    let server = HttpServer::new(move || {
        App::new().app_data(modules.clone()).route(
            "/{name}",
            web::get().to(
                |name: web::Path<String>, modules: web::Data<HashMap<String, &'static str>>| async move {
                    match modules.get(name.as_str()) {
                        Some(source) => HttpResponse::Ok().body(*source),
                        None => HttpResponse::NotFound().finish(),
                    }
                },
            ),
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

/// Pipeline using the default toolchain and a bare project manifest
struct RealBuild {
    pipeline: Pipeline,
    _cache: TempDir,
    _manifests: TempDir,
}

impl RealBuild {
    async fn new() -> Self {
        let manifests = TempDir::new().unwrap();
        std::fs::write(
            manifests.path().join("package.json"),
            r#"{"name":"fixture","private":true,"dependencies":{}}"#,
        )
        .unwrap();
        std::fs::write(
            manifests.path().join("tsconfig.json"),
            r#"{"compilerOptions":{"target":"es2015","module":"esnext","strict":true}}"#,
        )
        .unwrap();
        let cache = TempDir::new().unwrap();

        // bun writes the lockfile on first install
        let workspace = WorkspaceConfig {
            manifest_dir: manifests.path().to_path_buf(),
            manifest_files: vec!["package.json".to_string(), "tsconfig.json".to_string()],
            ..WorkspaceConfig::default()
        };
        let pipeline = Pipeline::new(
            Fetcher::new(&FetchConfig::default()).unwrap(),
            BundleCache::open(cache.path()).await.unwrap(),
            workspace,
            Toolchain::from_config(&ToolsConfig::default()),
            20,
        );

        Self {
            pipeline,
            _cache: cache,
            _manifests: manifests,
        }
    }

    async fn bundle(&self, url: &str) -> String {
        let key = match self.pipeline.resolve(url).await.unwrap() {
            Outcome::Ready { key, .. } => key,
            other => panic!("unexpected outcome: {other:?}"),
        };
        String::from_utf8(self.pipeline.cache().read(&key).await.unwrap()).unwrap()
    }
}

#[actix_web::test]
#[ignore = "needs bun on PATH"]
async fn trivial_entry_bundles_to_esm() {
    let base = serve_modules(&[("answer.ts", "export const answer: number = 42;\n")]).await;
    let build = RealBuild::new().await;

    let bundle = build.bundle(&format!("{base}/answer.ts")).await;

    assert!(bundle.contains("42"));
    assert!(bundle.contains("export{"), "not an ES module: {bundle}");
    assert!(!bundle.contains(": number"));
}

#[actix_web::test]
#[ignore = "needs bun on PATH and npm registry access"]
async fn undeclared_import_is_installed_and_inlined() {
    let base = serve_modules(&[(
        "odd.ts",
        "import isOdd from \"is-odd\";\nexport const three = isOdd(3);\n",
    )])
    .await;
    let build = RealBuild::new().await;

    let bundle = build.bundle(&format!("{base}/odd.ts")).await;

    assert!(bundle.contains("export{"), "not an ES module: {bundle}");
    // Inlined rather than left as an external import
    assert!(!bundle.contains("\"is-odd\""), "import not bundled: {bundle}");
    assert!(bundle.contains("expected a number"), "package code missing: {bundle}");
}

#[actix_web::test]
#[ignore = "needs bun on PATH"]
async fn syntax_error_reports_engine_text() {
    let base = serve_modules(&[("broken.ts", "export const = ;\n")]).await;
    let build = RealBuild::new().await;
    let url = format!("{base}/broken.ts");

    let err = build.pipeline.resolve(&url).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Bundle);
    assert!(err.to_string().contains("Expected identifier"), "{err}");
    assert!(!build.pipeline.cache().exists(&CacheKey::for_url(&url, 20)).await);
}
