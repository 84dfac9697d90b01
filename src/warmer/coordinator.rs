//! Warm-run coordinator - main run orchestration logic
//!
//! This module drives one complete warm run:
//! - creates the run log (run id, start timestamp, sheet name)
//! - spawns one task per target; targets run concurrently
//! - merges every target's rows after all tasks complete
//! - finalizes the run and flushes the log sink exactly once
//!
//! Per-target and per-URL failures are contained inside their task; the
//! finalize-and-flush step runs unconditionally once all tasks have been
//! joined, so a failing target can never suppress the run report.

use crate::config::{Config, TargetConfig};
use crate::discovery::discover_urls;
use crate::report::{OutcomeRow, RunLog, SheetSink};
use crate::warmer::fetcher::build_http_client;
use crate::warmer::purge::PurgeClient;
use crate::warmer::scheduler::TargetWarmer;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Runs a complete warm run across all configured targets
///
/// Returns an error only for startup faults (failing to construct the
/// purge client). Everything past startup is contained: the process-level
/// contract is to run to completion and let the run log tell the story.
pub async fn run_warm(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let mut run_log = RunLog::new();

    tracing::info!(
        "Starting warm run {} ({}) across {} targets",
        run_log.run_id(),
        run_log.sheet_name(),
        config.targets.len()
    );

    let purge_client = match &config.purge {
        Some(purge_config) => Some(Arc::new(PurgeClient::new(purge_config)?)),
        None => {
            tracing::info!("No purge credentials configured, purging disabled");
            None
        }
    };

    // All targets run concurrently; each task owns its failures and
    // returns only its rows
    let mut handles = Vec::with_capacity(config.targets.len());
    for target in config.targets.iter().cloned() {
        let config = Arc::clone(&config);
        let purge = purge_client.clone();
        handles.push(tokio::spawn(async move {
            warm_target(config, target, purge).await
        }));
    }

    for handle in handles {
        match handle.await {
            Ok(rows) => run_log.extend(rows),
            Err(e) => tracing::warn!("Target task aborted: {}", e),
        }
    }

    // Happens-after every append: all rows share this finish timestamp
    run_log.finalize();
    flush_run_log(&config, &run_log).await;

    tracing::info!(
        "Warm run {} finished with {} rows",
        run_log.run_id(),
        run_log.rows().len()
    );

    Ok(())
}

/// Discovers and warms one target, returning its outcome rows
///
/// Never fails: every failure mode ends up as a warning and/or a reduced
/// row set, so sibling targets are unaffected.
async fn warm_target(
    config: Arc<Config>,
    target: TargetConfig,
    purge: Option<Arc<PurgeClient>>,
) -> Vec<OutcomeRow> {
    let client = match build_http_client(
        &target,
        Duration::from_secs(config.warmer.fetch_timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                "Skipping target {}: failed to build HTTP client: {}",
                target.base_url,
                e
            );
            return Vec::new();
        }
    };

    let urls = discover_urls(
        &client,
        &target,
        Duration::from_secs(config.warmer.sitemap_timeout_secs),
    )
    .await;

    let mut rows = vec![OutcomeRow::discovery_summary(&target, urls.len())];

    let warmer = TargetWarmer::new(
        client,
        target,
        config.warmer.clone(),
        config.headers.clone(),
        purge,
    );
    rows.extend(warmer.warm_urls(&urls).await);

    rows
}

/// Flushes the finalized run log to the sink, if one is configured
///
/// Sink trouble is a warning: the run still completes and the rows are
/// simply not delivered.
async fn flush_run_log(config: &Config, run_log: &RunLog) {
    let Some(sink_config) = &config.log_sink else {
        tracing::info!(
            "No log sink configured, keeping {} rows local",
            run_log.rows().len()
        );
        return;
    };

    match SheetSink::new(sink_config) {
        Ok(sink) => {
            if let Err(e) = sink.flush(run_log).await {
                tracing::warn!("Run log flush failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("Could not build log sink client: {}", e),
    }
}
