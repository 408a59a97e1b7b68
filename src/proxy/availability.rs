//! Snapshot lookup against the archive's availability API.

use crate::proxy::codec::ArchiveCodec;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Result of resolving an original URL to an archived snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Archive-qualified URL to fetch
    Archived(String),
    /// The archive has no snapshot for the URL
    Unavailable,
}

/// Body of `GET <availability_url>?url=..&timestamp=..`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArchivedSnapshots {
    pub closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClosestSnapshot {
    #[serde(default = "default_available")]
    pub available: bool,
    pub url: Option<String>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub mimetype: Option<String>,
}

fn default_available() -> bool {
    true
}

impl AvailabilityResponse {
    /// Timestamp of the closest usable snapshot, if any.
    pub fn closest_timestamp(&self) -> Option<&str> {
        self.archived_snapshots
            .closest
            .as_ref()
            .filter(|closest| closest.available)
            .and_then(|closest| closest.timestamp.as_deref())
            .filter(|ts| !ts.is_empty())
    }
}

/// Translates original URLs into archive-qualified URLs.
///
/// With lookups enabled the archive is asked for the snapshot closest to the target
/// date; otherwise the target date itself is used and the archive picks the snapshot.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver {
    client: reqwest::Client,
    codec: ArchiveCodec,
    availability_url: String,
    target_date: String,
    lookup_closest_snapshot: bool,
}

impl AvailabilityResolver {
    pub fn new(
        client: reqwest::Client,
        codec: ArchiveCodec,
        availability_url: impl Into<String>,
        target_date: impl Into<String>,
        lookup_closest_snapshot: bool,
    ) -> Self {
        Self {
            client,
            codec,
            availability_url: availability_url.into(),
            target_date: target_date.into(),
            lookup_closest_snapshot,
        }
    }

    pub async fn resolve(&self, original_url: &str) -> Result<Availability> {
        if !self.lookup_closest_snapshot {
            return Ok(Availability::Archived(
                self.codec.encode(original_url, &self.target_date),
            ));
        }

        let lookup = self.lookup(original_url).await?;

        match lookup.closest_timestamp() {
            Some(timestamp) => {
                let archived = self.codec.encode(original_url, timestamp);
                tracing::debug!(url = %original_url, snapshot = %archived, "Resolved closest snapshot");
                Ok(Availability::Archived(archived))
            }
            None => {
                tracing::debug!(url = %original_url, "No archived snapshot");
                Ok(Availability::Unavailable)
            }
        }
    }

    async fn lookup(&self, original_url: &str) -> Result<AvailabilityResponse> {
        let response = self
            .client
            .get(&self.availability_url)
            .query(&[("url", original_url), ("timestamp", self.target_date.as_str())])
            .send()
            .await
            .context("Availability lookup failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Availability lookup returned HTTP {}", status.as_u16());
        }

        response
            .json::<AvailabilityResponse>()
            .await
            .context("Invalid availability response")
    }
}
