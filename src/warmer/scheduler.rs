//! Batch scheduler for warming one target's URL inventory
//!
//! The discovered URL sequence is partitioned into consecutive fixed-size
//! batches in discovery order. Within a batch every URL is warmed
//! concurrently; batches run serially with a mandatory delay in between to
//! throttle the outbound request rate. Each batch returns its rows, which
//! are merged synchronously, so no concurrency-safe accumulator is needed.

use crate::config::{HeadersConfig, TargetConfig, WarmerConfig};
use crate::report::OutcomeRow;
use crate::warmer::classifier::classify;
use crate::warmer::fetcher::{fetch_with_retry, RetryPolicy};
use crate::warmer::purge::{should_purge, PurgeClient};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Warms one target's URLs and produces their outcome rows
pub struct TargetWarmer {
    client: Client,
    target: TargetConfig,
    warmer: WarmerConfig,
    headers: HeadersConfig,
    purge: Option<Arc<PurgeClient>>,
}

impl TargetWarmer {
    pub fn new(
        client: Client,
        target: TargetConfig,
        warmer: WarmerConfig,
        headers: HeadersConfig,
        purge: Option<Arc<PurgeClient>>,
    ) -> Self {
        Self {
            client,
            target,
            warmer,
            headers,
            purge,
        }
    }

    /// Warms every URL, batch by batch
    ///
    /// URLs are processed in `ceil(n / batch_size)` consecutive batches
    /// preserving input order. All URLs of a batch run concurrently and the
    /// batch completes only when every one of them has finished, success or
    /// failure; rows are collected in completion order. Between batches the
    /// configured inter-batch delay is applied.
    pub async fn warm_urls(&self, urls: &[Url]) -> Vec<OutcomeRow> {
        let batch_size = self.warmer.batch_size.max(1);
        let batch_count = urls.len().div_ceil(batch_size);
        let mut rows = Vec::with_capacity(urls.len());

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(Duration::from_millis(self.warmer.inter_batch_delay_ms)).await;
            }

            tracing::debug!(
                "Warming batch {}/{} ({} URLs) for {}",
                index + 1,
                batch_count,
                batch.len(),
                self.target.base_url
            );

            let batch_futures: Vec<_> = batch.iter().map(|url| self.warm_one(url)).collect();
            let batch_rows: Vec<OutcomeRow> = stream::iter(batch_futures)
                .buffer_unordered(batch_size)
                .collect()
                .await;

            rows.extend(batch_rows);
        }

        rows
    }

    /// Warms one URL: fetch with retry, classify, decide on purge
    ///
    /// Failures become failure rows carrying the terminal error message;
    /// they skip classification and purge entirely. Purge failures only
    /// warn and never touch the row.
    async fn warm_one(&self, url: &Url) -> OutcomeRow {
        let policy = RetryPolicy {
            max_attempts: self.warmer.max_retries,
            delay: Duration::from_millis(self.warmer.retry_delay_ms),
        };

        let started = Instant::now();
        match fetch_with_retry(&self.client, url, &policy).await {
            Ok(response) => {
                let latency = started.elapsed();
                let status = response.status().as_u16();
                let classification = classify(response.headers(), &self.headers, &self.target.region);

                tracing::debug!(
                    "Warmed {} in {}ms: status {}, edge cache {}",
                    url,
                    latency.as_millis(),
                    status,
                    classification.edge_cache_status
                );

                let row = OutcomeRow::success(url, status, &classification, latency);

                if should_purge(&classification) {
                    if let Some(purge) = &self.purge {
                        match purge.purge_url(url).await {
                            Ok(()) => tracing::debug!("Purged {}", url),
                            Err(e) => tracing::warn!("Purge failed for {}: {}", url, e),
                        }
                    }
                }

                row
            }
            Err(error) => {
                let latency = started.elapsed();
                tracing::warn!("Warming failed for {}: {}", url, error);
                OutcomeRow::failure(url, &self.target.region, latency, error.to_string())
            }
        }
    }
}
