//! Response cache-status classification
//!
//! Maps raw response headers into a normalized cache-status record. This is
//! a pure function over the header map: it performs no I/O and cannot fail,
//! missing or unreadable headers become the [`UNKNOWN`] sentinel.
//!
//! Two independent caching layers are read:
//! - the origin/platform edge reports its cache status in one header
//! - the CDN reports its status, a trace/ray id whose trailing
//!   dash-delimited segment names the serving edge region, and a platform
//!   server id whose leading double-colon-delimited segment names the POP

use crate::config::HeadersConfig;
use reqwest::header::HeaderMap;

/// Sentinel used when a cache-status header is absent or unreadable
pub const UNKNOWN: &str = "UNKNOWN";

/// Normalized cache classification for one warmed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheClassification {
    /// Origin/platform edge cache status, uppercased
    pub origin_cache_status: String,

    /// CDN cache status, uppercased
    pub edge_cache_status: String,

    /// Point-of-presence id parsed from the platform server id header
    pub edge_pop_id: Option<String>,

    /// Edge region code parsed from the CDN trace id, falling back to the
    /// target's configured region code
    pub region_tag: String,
}

/// Classifies a response's cache headers
///
/// # Arguments
///
/// * `headers` - The response header map
/// * `names` - Deployment-specific header names to read
/// * `fallback_region` - The target's configured region code, used as the
///   region tag when no edge region code can be parsed
///
/// # Examples
///
/// ```
/// use reqwest::header::HeaderMap;
/// use stoker::config::HeadersConfig;
/// use stoker::warmer::classify;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("cf-cache-status", "Hit".parse().unwrap());
/// headers.insert("cf-ray", "8f2d4a1b2c3d-SIN".parse().unwrap());
///
/// let classification = classify(&headers, &HeadersConfig::default(), "id");
/// assert_eq!(classification.edge_cache_status, "HIT");
/// assert_eq!(classification.region_tag, "SIN");
/// ```
pub fn classify(
    headers: &HeaderMap,
    names: &HeadersConfig,
    fallback_region: &str,
) -> CacheClassification {
    let origin_cache_status = header_value(headers, &names.origin_status)
        .map(|v| v.to_uppercase())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let edge_cache_status = header_value(headers, &names.cdn_status)
        .map(|v| v.to_uppercase())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let edge_region = header_value(headers, &names.cdn_trace)
        .as_deref()
        .and_then(trailing_segment);

    let edge_pop_id = header_value(headers, &names.platform_id)
        .as_deref()
        .and_then(leading_pop);

    let region_tag = match edge_region {
        Some(code) if !code.eq_ignore_ascii_case(UNKNOWN) => code,
        _ => fallback_region.to_string(),
    };

    CacheClassification {
        origin_cache_status,
        edge_cache_status,
        edge_pop_id,
        region_tag,
    }
}

/// Reads a header value as a trimmed string, if present and valid UTF-8
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extracts the trailing dash-delimited segment of a trace id
///
/// `"8f2d4a1b2c3d-SIN"` yields `"SIN"`. A value without a dash is its own
/// final segment.
fn trailing_segment(value: &str) -> Option<String> {
    value
        .rsplit('-')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extracts the leading double-colon-delimited segment of a server id
///
/// `"cache-sin12345::hosted"` yields `"cache-sin12345"`.
fn leading_pop(value: &str) -> Option<String> {
    value
        .split("::")
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
