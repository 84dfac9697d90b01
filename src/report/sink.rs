//! Remote run-log sink
//!
//! The whole run is reported with a single POST carrying the sheet name,
//! the ordered column names, and one value array per outcome row. Without
//! sink configuration the flush is skipped; a failed flush is a warning,
//! the rows are simply not delivered (there is no retry).

use crate::config::SinkConfig;
use crate::report::run_log::{RunLog, COLUMNS};
use crate::{Result, StokerError};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Sheet-style log sink client
pub struct SheetSink {
    http: Client,
    url: String,
}

impl SheetSink {
    /// Creates a sink client for the configured endpoint
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    /// Flushes the run log in one POST
    ///
    /// Body: `{"sheetName": ..., "headers": [...], "rows": [[...], ...]}`.
    pub async fn flush(&self, log: &RunLog) -> Result<()> {
        let rows: Vec<_> = log.rows().iter().map(|row| log.row_values(row)).collect();

        let payload = json!({
            "sheetName": log.sheet_name(),
            "headers": COLUMNS,
            "rows": rows,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| StokerError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StokerError::SinkRejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(
            "Flushed {} rows to log sink as sheet '{}'",
            log.rows().len(),
            log.sheet_name()
        );

        Ok(())
    }
}
