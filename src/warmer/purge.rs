//! Purge decision and CDN purge API client
//!
//! Warming is only useful when it leaves a hit behind. When the CDN layer
//! reports anything other than a hit for a warmed URL, the stale copy is
//! purged so the next request repopulates the cache from origin.

use crate::config::PurgeConfig;
use crate::warmer::classifier::CacheClassification;
use crate::{Result, StokerError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Decides whether a warmed URL needs an explicit purge
///
/// Purge is triggered when the CDN-level cache status is not `HIT`,
/// case-insensitively. An absent or unknown status counts as not-a-hit and
/// purges: the policy favors freshness over minimizing purge calls.
///
/// # Examples
///
/// ```
/// use stoker::warmer::{should_purge, CacheClassification};
///
/// let hit = CacheClassification {
///     origin_cache_status: "HIT".to_string(),
///     edge_cache_status: "Hit".to_string(),
///     edge_pop_id: None,
///     region_tag: "id".to_string(),
/// };
/// assert!(!should_purge(&hit));
///
/// let miss = CacheClassification { edge_cache_status: "MISS".to_string(), ..hit };
/// assert!(should_purge(&miss));
/// ```
pub fn should_purge(classification: &CacheClassification) -> bool {
    !classification.edge_cache_status.eq_ignore_ascii_case("HIT")
}

#[derive(Serialize)]
struct PurgeRequest<'a> {
    files: [&'a str; 1],
}

#[derive(Deserialize)]
struct PurgeResponse {
    success: bool,
}

/// Client for the CDN's zone purge API
///
/// Constructed only when purge credentials are configured; without them
/// purging is skipped entirely and warming still runs in a degraded but
/// valid mode.
pub struct PurgeClient {
    http: Client,
    endpoint: String,
    api_token: String,
}

impl PurgeClient {
    /// Creates a purge client for the configured zone
    pub fn new(config: &PurgeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let endpoint = format!(
            "{}/zones/{}/purge_cache",
            config.api_base.trim_end_matches('/'),
            config.zone_id
        );

        Ok(Self {
            http,
            endpoint,
            api_token: config.api_token.clone(),
        })
    }

    /// Purges one URL from the CDN cache
    ///
    /// Sends `{"files": [url]}` with bearer-token auth. The API signals the
    /// result in a JSON `success` field; a non-2xx reply or `success:
    /// false` is an error. Callers treat purge errors as warnings, never as
    /// warming failures, and never retry.
    pub async fn purge_url(&self, url: &Url) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&PurgeRequest {
                files: [url.as_str()],
            })
            .send()
            .await
            .map_err(|source| StokerError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StokerError::PurgeRejected {
                url: url.to_string(),
                message: format!("HTTP status {status}"),
            });
        }

        let body: PurgeResponse =
            response
                .json()
                .await
                .map_err(|e| StokerError::PurgeRejected {
                    url: url.to_string(),
                    message: format!("unreadable purge response: {e}"),
                })?;

        if !body.success {
            return Err(StokerError::PurgeRejected {
                url: url.to_string(),
                message: "API reported success = false".to_string(),
            });
        }

        Ok(())
    }
}
