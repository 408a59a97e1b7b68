//! Fetching archived content and reconciling archive redirects.
//!
//! The archive answers many requests with a 301/302 that only moves between
//! snapshots of the same resource. Those are followed here and never reach the
//! client. Redirects that lead somewhere else are decoded back to original URLs
//! and handed to the caller to relay.

use crate::proxy::codec::{ArchiveCodec, is_equivalent};
use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, LOCATION};

/// What the archive ultimately answered for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx from the archive
    Terminal {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    /// A genuine site redirect; `location` is an original (non-archive) URL
    Redirect { status: u16, location: String },
    /// Any other status, or a redirect chain that did not settle
    Failure { status: u16, message: String },
}

pub struct UpstreamFetcher {
    client: reqwest::Client,
    codec: ArchiveCodec,
    max_redirects: usize,
}

impl UpstreamFetcher {
    /// `client` must be built with redirect following disabled.
    pub fn new(client: reqwest::Client, codec: ArchiveCodec, max_redirects: usize) -> Self {
        Self {
            client,
            codec,
            max_redirects,
        }
    }

    /// Fetch an archive-qualified URL.
    ///
    /// Transport errors (connect, timeout, body read) are returned as `Err`;
    /// everything the archive actually answered is an `UpstreamOutcome`.
    pub async fn fetch(&self, archive_url: &str) -> Result<UpstreamOutcome> {
        let mut current = archive_url.to_string();
        let mut hops = 0;

        loop {
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", current))?;

            let status = response.status().as_u16();

            match status {
                200..=299 => {
                    let content_type = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let body = response
                        .bytes()
                        .await
                        .context("Failed to read archive response body")?;

                    return Ok(UpstreamOutcome::Terminal {
                        status,
                        content_type,
                        body: body.to_vec(),
                    });
                }

                301 | 302 => {
                    let Some(location) = response
                        .headers()
                        .get(LOCATION)
                        .and_then(|v| v.to_str().ok())
                    else {
                        return Ok(UpstreamOutcome::Failure {
                            status,
                            message: "redirect without Location header".to_string(),
                        });
                    };
                    let location = resolve_location(&current, location);

                    let requested = self.codec.decode(&current);
                    let target = self.codec.decode(&location);

                    if !is_equivalent(&requested, &target) {
                        return Ok(UpstreamOutcome::Redirect {
                            status,
                            location: target,
                        });
                    }

                    hops += 1;
                    if hops > self.max_redirects {
                        tracing::warn!(
                            url = %archive_url,
                            max_redirects = self.max_redirects,
                            "Archive redirect loop"
                        );
                        return Ok(UpstreamOutcome::Failure {
                            status,
                            message: format!(
                                "redirect loop: more than {} archive redirects",
                                self.max_redirects
                            ),
                        });
                    }

                    tracing::debug!(from = %current, to = %location, "Following archive redirect");
                    current = location;
                }

                _ => {
                    return Ok(UpstreamOutcome::Failure {
                        status,
                        message: format!("HTTP error: {}", status),
                    });
                }
            }
        }
    }
}

/// Resolves a possibly relative `Location` against the URL that returned it.
fn resolve_location(current: &str, location: &str) -> String {
    match url::Url::parse(location) {
        Ok(_) => location.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse(current)
            .and_then(|base| base.join(location))
            .map(|joined| joined.to_string())
            .unwrap_or_else(|_| location.to_string()),
        Err(_) => location.to_string(),
    }
}
