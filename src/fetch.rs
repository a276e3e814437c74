//! Upstream source fetching with manual redirect resolution
//!
//! The HTTP client never follows redirects on its own: every hop is walked
//! here so callers can compare the requested URL with the canonical one.

use crate::config::schema::FetchConfig;
use crate::error::{BundleError, BundleResult};
use reqwest::header::LOCATION;
use reqwest::{redirect, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

/// Source module resolved through all redirects
#[derive(Debug, Clone)]
pub struct FetchedSource {
    /// URL as requested by the client
    pub requested_url: String,
    /// URL reached after the last redirect
    pub canonical_url: String,
    /// Body of the terminal 200 response
    pub body: Vec<u8>,
}

impl FetchedSource {
    /// True when no redirect was followed
    pub fn is_canonical(&self) -> bool {
        self.requested_url == self.canonical_url
    }
}

/// Redirect statuses followed by the fetcher; anything else non-200 fails
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
    )
}

/// HTTP fetcher for source modules
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Fetcher {
    /// Create a fetcher with automatic redirects disabled
    pub fn new(config: &FetchConfig) -> BundleResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BundleError::HttpClient)?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    /// Fetch a URL, following up to `max_redirects` redirect hops
    pub async fn fetch(&self, url: &str) -> BundleResult<FetchedSource> {
        let mut current = Url::parse(url).map_err(|e| BundleError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        // Only replaced on a redirect, so an un-redirected URL stays byte-identical
        let mut canonical = url.to_string();
        let mut hops = 0;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|source| BundleError::Fetch {
                    url: canonical.clone(),
                    source,
                })?;

            let status = response.status();
            if is_redirect(status) {
                if hops == self.max_redirects {
                    return Err(BundleError::TooManyRedirects {
                        url: url.to_string(),
                        limit: self.max_redirects,
                    });
                }

                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| BundleError::Upstream {
                        url: canonical.clone(),
                        status: status.to_string(),
                        body: "redirect without Location header".to_string(),
                    })?;

                let next = current.join(location).map_err(|e| BundleError::InvalidUrl {
                    url: location.to_string(),
                    reason: e.to_string(),
                })?;

                debug!("Redirect {} {} -> {}", status.as_u16(), canonical, next);
                hops += 1;
                canonical = next.to_string();
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(BundleError::Upstream {
                    url: canonical,
                    status: status.to_string(),
                    body,
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|source| BundleError::Fetch {
                    url: canonical.clone(),
                    source,
                })?;

            return Ok(FetchedSource {
                requested_url: url.to_string(),
                canonical_url: canonical,
                body: body.to_vec(),
            });
        }
    }
}
