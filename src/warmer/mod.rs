//! Warming module: fetch, classify, purge, schedule
//!
//! This module contains the core warming logic, including:
//! - HTTP fetching with bounded retry for transient failures
//! - Cache-status classification of responses
//! - The purge decision policy and purge API client
//! - Batch scheduling and overall run coordination

mod classifier;
mod coordinator;
mod fetcher;
mod purge;
mod scheduler;

pub use classifier::{classify, CacheClassification, UNKNOWN};
pub use coordinator::run_warm;
pub use fetcher::{build_http_client, fetch_with_retry, ErrorClass, RetryPolicy};
pub use purge::{should_purge, PurgeClient};
pub use scheduler::TargetWarmer;

use crate::config::Config;
use crate::Result;

/// Runs a complete warm run
///
/// This is the main entry point for warming. It will:
/// 1. Create the run context (run id, start timestamp, sheet name)
/// 2. Discover each target's URL inventory from its sitemap
/// 3. Warm every URL in concurrency-bounded batches
/// 4. Classify responses and purge non-hits
/// 5. Flush the accumulated run log exactly once
///
/// # Arguments
///
/// * `config` - The warmer configuration
///
/// # Returns
///
/// * `Ok(())` - Run completed (individual URL or target failures included)
/// * `Err(StokerError)` - Startup fault before any warming began
pub async fn warm(config: Config) -> Result<()> {
    run_warm(config).await
}
