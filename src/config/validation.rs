use crate::config::types::{Config, PurgeConfig, SinkConfig, TargetConfig, WarmerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_warmer_config(&config.warmer)?;
    validate_targets(&config.targets)?;
    if let Some(purge) = &config.purge {
        validate_purge_config(purge)?;
    }
    if let Some(sink) = &config.log_sink {
        validate_sink_config(sink)?;
    }
    Ok(())
}

/// Validates warming behavior configuration
fn validate_warmer_config(config: &WarmerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.fetch_timeout_secs < 1 || config.sitemap_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeouts must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates target entries
fn validate_targets(targets: &[TargetConfig]) -> Result<(), ConfigError> {
    if targets.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[target]] must be configured".to_string(),
        ));
    }

    for target in targets {
        if target.region.is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty region code",
                target.base_url
            )));
        }

        validate_http_url(&target.base_url, "base-url")?;

        if let Some(proxy) = &target.proxy_url {
            // Proxy URLs may use http, https, or socks5 schemes
            let url = Url::parse(proxy)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy-url '{proxy}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https" | "socks5" | "socks5h") {
                return Err(ConfigError::Validation(format!(
                    "proxy-url '{proxy}' must use http(s) or socks5 scheme"
                )));
            }
        }

        if let Some(agent) = &target.user_agent {
            if agent.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "target '{}' has an empty user-agent",
                    target.base_url
                )));
            }
        }
    }

    Ok(())
}

/// Validates purge API credentials
fn validate_purge_config(config: &PurgeConfig) -> Result<(), ConfigError> {
    if config.zone_id.is_empty() {
        return Err(ConfigError::Validation(
            "purge zone-id cannot be empty".to_string(),
        ));
    }

    if config.api_token.is_empty() {
        return Err(ConfigError::Validation(
            "purge api-token cannot be empty".to_string(),
        ));
    }

    validate_http_url(&config.api_base, "purge api-base")?;

    Ok(())
}

/// Validates the log sink endpoint
fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.url, "log-sink url")
}

/// Validates that a string parses as an absolute http(s) URL
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {field} '{value}': {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{field} '{value}' must use http or https scheme"
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("{field} '{value}' has no host")));
    }

    Ok(())
}
