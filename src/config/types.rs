use serde::Deserialize;

/// Default User-Agent sent when a target does not configure its own
pub const DEFAULT_USER_AGENT: &str = concat!("stoker/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure for Stoker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub warmer: WarmerConfig,
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(rename = "target")]
    pub targets: Vec<TargetConfig>,
    pub purge: Option<PurgeConfig>,
    #[serde(rename = "log-sink")]
    pub log_sink: Option<SinkConfig>,
}

/// Warming behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WarmerConfig {
    /// Number of URLs fetched concurrently within one batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay between consecutive batches (milliseconds)
    #[serde(rename = "inter-batch-delay-ms", default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Maximum fetch attempts per URL for transient failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Timeout for sitemap fetches (seconds)
    #[serde(rename = "sitemap-timeout-secs", default = "default_sitemap_timeout_secs")]
    pub sitemap_timeout_secs: u64,

    /// Timeout for page warming fetches (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for WarmerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            sitemap_timeout_secs: default_sitemap_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    1
}

fn default_inter_batch_delay_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_sitemap_timeout_secs() -> u64 {
    15
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

/// Response header names the classifier reads, per deployment
#[derive(Debug, Clone, Deserialize)]
pub struct HeadersConfig {
    /// Origin/platform cache status header
    #[serde(rename = "origin-status", default = "default_origin_status_header")]
    pub origin_status: String,

    /// CDN cache status header
    #[serde(rename = "cdn-status", default = "default_cdn_status_header")]
    pub cdn_status: String,

    /// CDN trace/ray id header (dash-delimited, edge region code last)
    #[serde(rename = "cdn-trace", default = "default_cdn_trace_header")]
    pub cdn_trace: String,

    /// Platform server id header (double-colon-delimited, POP id first)
    #[serde(rename = "platform-id", default = "default_platform_id_header")]
    pub platform_id: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            origin_status: default_origin_status_header(),
            cdn_status: default_cdn_status_header(),
            cdn_trace: default_cdn_trace_header(),
            platform_id: default_platform_id_header(),
        }
    }
}

fn default_origin_status_header() -> String {
    "x-cache-status".to_string()
}

fn default_cdn_status_header() -> String {
    "cf-cache-status".to_string()
}

fn default_cdn_trace_header() -> String {
    "cf-ray".to_string()
}

fn default_platform_id_header() -> String {
    "x-served-by".to_string()
}

/// One site to warm, with its per-target transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Region code this target is warmed for (used as the log's region
    /// fallback when no edge code can be parsed from a response)
    pub region: String,

    /// Base URL of the site (sitemap entry points are derived from it)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User-Agent header sent with every request for this target
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Proxy URL for this target's requests
    #[serde(rename = "proxy-url")]
    pub proxy_url: Option<String>,
}

impl TargetConfig {
    /// Returns the User-Agent to send for this target
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// CDN purge API credentials; absent section disables purging
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeConfig {
    /// CDN zone identifier
    #[serde(rename = "zone-id")]
    pub zone_id: String,

    /// Bearer token for the purge API
    #[serde(rename = "api-token")]
    pub api_token: String,

    /// Purge API base URL
    #[serde(rename = "api-base", default = "default_purge_api_base")]
    pub api_base: String,
}

fn default_purge_api_base() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

/// Remote run-log sink; absent section disables remote logging
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Endpoint receiving the single end-of-run flush
    pub url: String,
}
