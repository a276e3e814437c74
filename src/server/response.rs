//! Bundle and error responses
//!
//! Bundles are served with a content-derived ETag and a long public cache
//! lifetime. Failures are rendered as a small script of `console.error`
//! calls so that a failing import still executes and logs on the client.

use crate::cache::{etag, BundleCache, CacheKey};
use crate::error::BundleError;
use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use tracing::warn;

/// How bundles are validated and cached by clients
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    /// Digest bytes used for the ETag
    pub etag_bytes: usize,
    /// `Cache-Control: max-age`
    pub max_age_secs: u64,
}

/// Serve the cached bundle for `key`, honoring `If-None-Match`
pub async fn serve_bundle(
    req: &HttpRequest,
    cache: &BundleCache,
    key: &CacheKey,
    options: ServeOptions,
) -> HttpResponse {
    let bundle = match cache.read(key).await {
        Ok(bundle) => bundle,
        Err(e) => return error_script(&e),
    };

    let tag = etag(&bundle, options.etag_bytes);
    let if_none_match = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    if if_none_match == Some(tag.as_str()) {
        return HttpResponse::NotModified()
            .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .finish();
    }

    // Content-Length is written by actix for sized bodies
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header(javascript())
        .insert_header((header::ETAG, tag))
        .insert_header((
            header::CACHE_CONTROL,
            format!("public, max-age={}", options.max_age_secs),
        ))
        .body(bundle)
}

/// Redirect to the canonical form of a bundle URL
pub fn redirect_to(canonical_url: &str) -> HttpResponse {
    HttpResponse::build(StatusCode::FOUND)
        .insert_header((header::LOCATION, format!("/{}", canonical_url)))
        .finish()
}

/// Render a pipeline failure as executable script
///
/// The status stays 200 so importers log the failure instead of hitting a
/// network error.
pub fn error_script(err: &BundleError) -> HttpResponse {
    warn!(stage = %err.stage(), "{}", err);
    HttpResponse::Ok()
        .insert_header(javascript())
        .body(error_body(&err.summary(), &err.to_string()))
}

fn error_body(summary: &str, detail: &str) -> String {
    let summary = serde_json::to_string(summary).unwrap_or_default();
    let detail = serde_json::to_string(detail).unwrap_or_default();
    format!("console.error({});console.error({})", summary, detail)
}

fn javascript() -> ContentType {
    ContentType(actix_web::mime::APPLICATION_JAVASCRIPT)
}
