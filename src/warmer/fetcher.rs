//! HTTP fetcher implementation
//!
//! This module handles the warming requests themselves, including:
//! - Building per-target HTTP clients (User-Agent, proxy, timeouts)
//! - Classifying request failures as transient or permanent
//! - Retry logic for transient failures
//!
//! HTTP error statuses (4xx/5xx) are responses, not failures: the point of
//! a warming request is whatever the edge returns, so they are handed back
//! to the caller for classification like any other response.

use crate::config::TargetConfig;
use reqwest::{redirect::Policy, Client};
use std::error::Error as _;
use std::io::ErrorKind;
use std::time::Duration;
use url::Url;

/// How a failed fetch should be handled by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying: timeout, connection reset, connection aborted
    Transient,

    /// Not worth retrying: DNS, TLS, refused connections, malformed
    /// requests and everything else
    Permanent,
}

impl ErrorClass {
    /// Classifies a request error
    ///
    /// Timeouts are transient. Connection-level errors are transient only
    /// when the underlying IO error is a reset or abort; a refused
    /// connection or failed DNS lookup will not heal within one run.
    pub fn of(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return ErrorClass::Transient;
        }

        if let Some(kind) = io_error_kind(error) {
            if is_transient_io(kind) {
                return ErrorClass::Transient;
            }
        }

        ErrorClass::Permanent
    }
}

/// Returns true for IO error kinds that indicate a transient condition
fn is_transient_io(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

/// Walks an error's source chain looking for an underlying IO error
fn io_error_kind(error: &reqwest::Error) -> Option<ErrorKind> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = err.source();
    }
    None
}

/// Retry bounds for one warming fetch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed, counting the first
    pub max_attempts: u32,

    /// Fixed delay between attempts
    pub delay: Duration,
}

/// Builds the HTTP client used for one target
///
/// The client carries the target's User-Agent, the warming fetch timeout,
/// and the target's proxy when one is configured.
///
/// # Arguments
///
/// * `target` - The target whose transport settings to apply
/// * `timeout` - Overall per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. bad proxy URL)
pub fn build_http_client(target: &TargetConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(target.user_agent())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &target.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    builder.build()
}

/// Performs a GET with bounded retry for transient failures
///
/// Retries only errors classified [`ErrorClass::Transient`], sleeping
/// `policy.delay` between attempts, up to `policy.max_attempts` total
/// attempts. A permanent error returns immediately after one attempt.
/// Exhausting the attempts returns the last transient error; the caller
/// turns that into a failed outcome row, never a fatal error.
pub async fn fetch_with_retry(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt: u32 = 1;

    loop {
        match client.get(url.clone()).send().await {
            Ok(response) => return Ok(response),
            Err(error) => match ErrorClass::of(&error) {
                ErrorClass::Permanent => return Err(error),
                ErrorClass::Transient if attempt >= policy.max_attempts => return Err(error),
                ErrorClass::Transient => {
                    tracing::warn!(
                        "Transient error fetching {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        policy.max_attempts,
                        error
                    );
                    tokio::time::sleep(policy.delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
