//! Time travel proxy core
//!
//! This module turns a requested original URL into the archived response the
//! client sees: snapshot lookup, archive fetch with redirect reconciliation, and
//! the mapping of upstream outcomes onto client responses.

pub mod availability;
pub mod codec;
pub mod upstream;

pub use availability::{Availability, AvailabilityResolver};
pub use codec::{ArchiveCodec, is_equivalent};
pub use upstream::{UpstreamFetcher, UpstreamOutcome};

use crate::config::Config;
use crate::http::response::{Response, StatusCode};
use anyhow::{Context, Result};

/// Used when the archive does not say what it sent.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Everything a connection needs to answer a request. Immutable once built.
pub struct TimeTravelProxy {
    config: Config,
    resolver: AvailabilityResolver,
    fetcher: UpstreamFetcher,
}

impl TimeTravelProxy {
    pub fn new(config: Config) -> Result<Self> {
        // One outbound connection per attempt: no idle pooling, no redirects, no env proxies.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .no_proxy()
            .build()
            .context("Failed to build archive HTTP client")?;

        let codec = ArchiveCodec::new(config.archive_base.clone());
        let resolver = AvailabilityResolver::new(
            client.clone(),
            codec.clone(),
            config.availability_url.clone(),
            config.target_date.clone(),
            config.lookup_closest_snapshot,
        );
        let fetcher = UpstreamFetcher::new(client, codec, config.max_redirects);

        Ok(Self {
            config,
            resolver,
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Produces the client response for `url`. Never fails: errors become a 502.
    pub async fn respond(&self, url: &str) -> Response {
        match self.try_respond(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %format!("{:#}", e), "Proxy request failed");
                Response::bad_gateway(&format!("{:#}", e))
            }
        }
    }

    async fn try_respond(&self, url: &str) -> Result<Response> {
        let archive_url = match self.resolver.resolve(url).await? {
            Availability::Archived(archive_url) => archive_url,
            Availability::Unavailable => return Ok(Response::not_found(url)),
        };

        let outcome = self.fetcher.fetch(&archive_url).await?;
        Ok(self.outcome_to_response(url, outcome))
    }

    fn outcome_to_response(&self, url: &str, outcome: UpstreamOutcome) -> Response {
        match outcome {
            UpstreamOutcome::Terminal {
                content_type, body, ..
            } => Response::ok(content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE), body),

            UpstreamOutcome::Redirect { status, location } => {
                tracing::info!(url = %url, status, location = %location, "Relaying site redirect");
                match StatusCode::from_redirect(status) {
                    Some(status) => Response::redirect(status, &location),
                    None => Response::bad_gateway(&format!(
                        "The remote server returned HTTP {}",
                        status
                    )),
                }
            }

            UpstreamOutcome::Failure { status: 404, .. } => {
                tracing::info!(url = %url, "Archive returned HTTP 404");
                Response::not_found(url)
            }

            UpstreamOutcome::Failure { status, message } => {
                tracing::warn!(url = %url, status, message = %message, "Archive request failed");
                Response::bad_gateway(&message)
            }
        }
    }
}
