//! Stoker: a sitemap-driven CDN cache warmer
//!
//! This crate discovers a site's URL inventory from its sitemap, fetches every
//! URL to populate upstream HTTP caches, classifies each response by the cache
//! status reported by the CDN and platform edge layers, purges the CDN copy
//! when warming did not produce a hit, and reports the whole run once to a
//! remote sheet-style log sink.

pub mod config;
pub mod discovery;
pub mod report;
pub mod url;
pub mod warmer;

use thiserror::Error;

/// Main error type for Stoker operations
#[derive(Debug, Error)]
pub enum StokerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Sitemap parse error for {url}: {message}")]
    SitemapParse { url: String, message: String },

    #[error("Purge request for {url} rejected: {message}")]
    PurgeRejected { url: String, message: String },

    #[error("Log sink rejected flush with status {status}")]
    SinkRejected { status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Stoker operations
pub type Result<T> = std::result::Result<T, StokerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use report::{OutcomeRow, RunLog};
pub use self::url::{host_key, same_site};
pub use warmer::run_warm;
