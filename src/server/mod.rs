//! HTTP front end
//!
//! | Path | Behavior |
//! |------|----------|
//! | `GET /` | Landing page |
//! | `GET /<url>[?query]` | Bundle `<url>`; 302 to the canonical URL if it redirects |
//!
//! Every failure after dispatch is answered with a 200 error script, so the
//! only other statuses are the redirect, `304 Not Modified` and the 405 for
//! non-GET methods.

mod landing;
mod response;

pub use response::{error_script, redirect_to, serve_bundle, ServeOptions};

use crate::config::Config;
use crate::error::{BundleError, BundleResult};
use crate::pipeline::{Outcome, Pipeline};
use crate::toolchain::Toolchain;
use actix_web::body::{BodySize, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::{from_fn, Next};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// State shared by all workers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub options: ServeOptions,
}

/// Register the landing page and the bundle catch-all
///
/// Both are GET only; other methods get `405 Method Not Allowed`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(landing::landing))
        .route("/{tail:.*}", web::get().to(dispatch));
}

/// The upstream URL a request path names: the path without its leading
/// slash, plus the query string when there is one
pub fn target_url(req: &HttpRequest) -> String {
    let path = req.path().strip_prefix('/').unwrap_or(req.path());
    match req.query_string() {
        "" => path.to_string(),
        query => format!("{}?{}", path, query),
    }
}

async fn dispatch(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let url = target_url(&req);

    match state.pipeline.resolve(&url).await {
        Ok(Outcome::Redirect { canonical_url }) => redirect_to(&canonical_url),
        Ok(Outcome::Ready { key, cache_hit }) => {
            debug!(hash = %key, cache_hit, "serving bundle");
            serve_bundle(&req, state.pipeline.cache(), &key, state.options).await
        }
        Err(e) => error_script(&e),
    }
}

/// Log one line per completed request
async fn log_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.path().to_string();

    let res = next.call(req).await?;

    let size = match res.response().body().size() {
        BodySize::Sized(n) => n,
        _ => 0,
    };
    info!(
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        size,
        duration = ?start.elapsed(),
        "request completed"
    );
    Ok(res)
}

/// Run the server until it receives a termination signal
///
/// Fails only at startup: when the cache directory cannot be created or the
/// listen address cannot be bound.
pub async fn run(config: &Config) -> BundleResult<()> {
    let pipeline = Arc::new(Pipeline::from_config(config).await?);
    Toolchain::check_available(&config.tools).await;

    let state = AppState {
        pipeline,
        options: ServeOptions {
            etag_bytes: config.cache.etag_bytes,
            max_age_secs: config.cache.max_age_secs,
        },
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(from_fn(log_requests))
            .configure(routes)
    })
    .shutdown_timeout(config.server.shutdown_timeout_secs);
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    let server = server
        .bind(addr.as_str())
        .map_err(|e| BundleError::Bind { addr, source: e })?;

    info!(
        cache_dir = %config.cache.dir.display(),
        "Starting server on http://localhost:{}", config.server.port
    );
    server
        .run()
        .await
        .map_err(|e| BundleError::io("run server", e))?;
    info!("Server exited");
    Ok(())
}
