//! In-memory run log
//!
//! One [`RunLog`] exists per process invocation. It owns the run identity
//! (random run id, start timestamp, sheet name) and the ordered sequence of
//! outcome rows accumulated across all targets. The finish timestamp is set
//! exactly once, after every target has completed, and is backfilled
//! uniformly into every row at serialization time.

use crate::config::TargetConfig;
use crate::warmer::CacheClassification;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Ordered column names for the sink flush; kept in lockstep with
/// [`RunLog::row_values`]
pub const COLUMNS: &[&str] = &[
    "run_id",
    "run_started_at",
    "run_finished_at",
    "region",
    "url",
    "status_code",
    "origin_cache_status",
    "edge_cache_status",
    "edge_pop",
    "latency_ms",
    "error",
    "message",
];

/// Sheet names and row timestamps are rendered at the deployment's home
/// timezone (+07:00) so runs group the same way regardless of host clock
const REPORT_TZ_OFFSET_SECS: i32 = 7 * 3600;

/// Outcome of warming one URL (or of discovery, for summary rows)
#[derive(Debug, Clone)]
pub struct OutcomeRow {
    pub region_tag: String,
    pub url: String,
    pub status_code: Option<u16>,
    pub origin_cache_status: String,
    pub edge_cache_status: String,
    pub edge_pop_id: Option<String>,
    pub latency_ms: u64,
    pub error: bool,
    pub message: String,
}

impl OutcomeRow {
    /// Row for a successfully warmed URL
    pub fn success(
        url: &Url,
        status_code: u16,
        classification: &CacheClassification,
        latency: Duration,
    ) -> Self {
        Self {
            region_tag: classification.region_tag.clone(),
            url: url.to_string(),
            status_code: Some(status_code),
            origin_cache_status: classification.origin_cache_status.clone(),
            edge_cache_status: classification.edge_cache_status.clone(),
            edge_pop_id: classification.edge_pop_id.clone(),
            latency_ms: latency.as_millis() as u64,
            error: false,
            message: String::new(),
        }
    }

    /// Row for a URL whose warming fetch failed after retry exhaustion
    pub fn failure(url: &Url, region: &str, latency: Duration, message: String) -> Self {
        Self {
            region_tag: region.to_string(),
            url: url.to_string(),
            status_code: None,
            origin_cache_status: String::new(),
            edge_cache_status: String::new(),
            edge_pop_id: None,
            latency_ms: latency.as_millis() as u64,
            error: true,
            message,
        }
    }

    /// Summary row recording how many URLs discovery produced for a target
    pub fn discovery_summary(target: &TargetConfig, url_count: usize) -> Self {
        Self {
            region_tag: target.region.clone(),
            url: target.base_url.clone(),
            status_code: None,
            origin_cache_status: String::new(),
            edge_cache_status: String::new(),
            edge_pop_id: None,
            latency_ms: 0,
            error: false,
            message: format!("discovered {url_count} URLs from sitemap"),
        }
    }
}

/// Accumulated state for one warm run
#[derive(Debug)]
pub struct RunLog {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    sheet_name: String,
    rows: Vec<OutcomeRow>,
}

impl RunLog {
    /// Creates a run log stamped with a fresh run id and start time
    pub fn new() -> Self {
        let started_at = Utc::now();
        Self::started_at(started_at)
    }

    /// Creates a run log for a given start instant
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: None,
            sheet_name: derive_sheet_name(started_at),
            rows: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn rows(&self) -> &[OutcomeRow] {
        &self.rows
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Appends one row
    pub fn append(&mut self, row: OutcomeRow) {
        self.rows.push(row);
    }

    /// Appends a target's rows in order
    pub fn extend(&mut self, rows: Vec<OutcomeRow>) {
        self.rows.extend(rows);
    }

    /// Sets the finish timestamp; later calls are ignored so the first
    /// finalization wins
    pub fn finalize(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Serializes one row as ordered values matching [`COLUMNS`]
    ///
    /// The run-level fields (run id, start/finish timestamps) are injected
    /// here so every row of a run carries identical values.
    pub fn row_values(&self, row: &OutcomeRow) -> Vec<Value> {
        vec![
            json!(self.run_id.to_string()),
            json!(format_timestamp(self.started_at)),
            self.finished_at
                .map(|t| json!(format_timestamp(t)))
                .unwrap_or(Value::Null),
            json!(row.region_tag),
            json!(row.url),
            row.status_code.map(|s| json!(s)).unwrap_or(Value::Null),
            json!(row.origin_cache_status),
            json!(row.edge_cache_status),
            row.edge_pop_id
                .as_ref()
                .map(|p| json!(p))
                .unwrap_or(Value::Null),
            json!(row.latency_ms),
            json!(row.error),
            json!(row.message),
        ]
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

fn report_offset() -> FixedOffset {
    FixedOffset::east_opt(REPORT_TZ_OFFSET_SECS).expect("+07:00 is a valid offset")
}

/// Derives the run-scoped sheet name from the start time
fn derive_sheet_name(started_at: DateTime<Utc>) -> String {
    format!(
        "warm-{}",
        started_at.with_timezone(&report_offset()).format("%Y%m%d-%H%M")
    )
}

/// Renders a timestamp at the report timezone
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&report_offset())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}
