//! Sitemap-driven URL discovery
//!
//! This module turns a configured target into its warmable URL inventory:
//! - fetches the target's sitemap entry points
//! - follows one level of sitemap-index indirection
//! - deduplicates and filters the result to the target's own host
//!
//! Discovery is deliberately forgiving: any fetch or parse failure for a
//! given sitemap contributes zero URLs and a warning, never an error that
//! could abort sibling targets running concurrently.

mod sitemap;

pub use sitemap::{parse_sitemap, SitemapDocument};

use crate::config::TargetConfig;
use crate::url::same_site;
use crate::{Result, StokerError};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Sitemap entry points probed in order; the first that yields URLs wins
const SITEMAP_ENTRY_POINTS: &[&str] = &["sitemap_index.xml", "sitemap.xml"];

/// Discovers the warmable URL inventory for one target
///
/// Probes `{base-url}/sitemap_index.xml` then `{base-url}/sitemap.xml`.
/// An index document triggers a second fetch+parse pass per child sitemap,
/// unioning the results. The returned list is deduplicated, contains only
/// absolute URLs on the target's own host (a leading `www.` is ignored when
/// comparing), and preserves first-seen sitemap order.
///
/// Failures are logged as warnings and reduce the contribution of the
/// failing sitemap to zero URLs; this function itself never fails.
pub async fn discover_urls(
    client: &Client,
    target: &TargetConfig,
    sitemap_timeout: Duration,
) -> Vec<Url> {
    let base = match Url::parse(&target.base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Skipping target with unparseable base URL {}: {}", target.base_url, e);
            return Vec::new();
        }
    };

    let mut locs: Vec<String> = Vec::new();

    for entry_point in SITEMAP_ENTRY_POINTS {
        let entry_url = match base.join(entry_point) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot derive {} for {}: {}", entry_point, base, e);
                continue;
            }
        };

        match fetch_document(client, &entry_url, sitemap_timeout).await {
            Ok(SitemapDocument::UrlSet(urls)) => {
                tracing::debug!("{} listed {} page URLs", entry_url, urls.len());
                locs = urls;
            }
            Ok(SitemapDocument::Index(children)) => {
                tracing::debug!("{} is an index with {} child sitemaps", entry_url, children.len());
                locs = fetch_children(client, &entry_url, children, sitemap_timeout).await;
            }
            Err(e) => {
                tracing::warn!("Sitemap fetch failed for {}: {}", entry_url, e);
                continue;
            }
        }

        if !locs.is_empty() {
            break;
        }
    }

    let urls = filter_and_dedup(locs, &base);
    tracing::info!(
        "Discovered {} URLs for {} (region {})",
        urls.len(),
        target.base_url,
        target.region
    );
    urls
}

/// Fetches every child sitemap of an index and unions their page URLs
///
/// A child that fails to fetch or parse, or that turns out to be another
/// index, contributes nothing.
async fn fetch_children(
    client: &Client,
    index_url: &Url,
    children: Vec<String>,
    timeout: Duration,
) -> Vec<String> {
    let mut locs = Vec::new();

    for child in children {
        let child_url = match index_url.join(&child) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping unparseable child sitemap {}: {}", child, e);
                continue;
            }
        };

        match fetch_document(client, &child_url, timeout).await {
            Ok(SitemapDocument::UrlSet(urls)) => {
                tracing::debug!("Child sitemap {} listed {} URLs", child_url, urls.len());
                locs.extend(urls);
            }
            Ok(SitemapDocument::Index(_)) => {
                // One level of indirection only
                tracing::warn!("Child sitemap {} is itself an index, skipping", child_url);
            }
            Err(e) => {
                tracing::warn!("Child sitemap fetch failed for {}: {}", child_url, e);
            }
        }
    }

    locs
}

/// Fetches and parses one sitemap document
async fn fetch_document(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<SitemapDocument> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| StokerError::Http {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(StokerError::SitemapParse {
            url: url.to_string(),
            message: format!("HTTP status {}", response.status()),
        });
    }

    let body = response.bytes().await.map_err(|source| StokerError::Http {
        url: url.to_string(),
        source,
    })?;

    parse_sitemap(&body).map_err(|e| StokerError::SitemapParse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Deduplicates loc entries and filters them to the target's own host
///
/// Relative and unparseable entries are dropped. Order of first appearance
/// is preserved so batching stays deterministic.
fn filter_and_dedup(locs: Vec<String>, base: &Url) -> Vec<Url> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut urls = Vec::new();

    for loc in locs {
        let url = match Url::parse(&loc) {
            Ok(url) => url,
            Err(_) => {
                tracing::debug!("Ignoring non-absolute loc entry: {}", loc);
                continue;
            }
        };

        if !same_site(base, &url) {
            tracing::debug!("Ignoring cross-host loc entry: {}", url);
            continue;
        }

        if seen.insert(url.as_str().to_string()) {
            urls.push(url);
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test/").unwrap()
    }

    #[test]
    fn test_filter_keeps_same_host_only() {
        let locs = vec![
            "https://example.test/a".to_string(),
            "https://other.test/c".to_string(),
            "https://example.test/b".to_string(),
        ];

        let urls = filter_and_dedup(locs, &base());
        let strs: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
        assert_eq!(strs, vec!["https://example.test/a", "https://example.test/b"]);
    }

    #[test]
    fn test_filter_dedups_preserving_first_seen_order() {
        let locs = vec![
            "https://example.test/b".to_string(),
            "https://example.test/a".to_string(),
            "https://example.test/b".to_string(),
            "https://example.test/a".to_string(),
        ];

        let urls = filter_and_dedup(locs, &base());
        let strs: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
        assert_eq!(strs, vec!["https://example.test/b", "https://example.test/a"]);
    }

    #[test]
    fn test_filter_is_www_insensitive() {
        let locs = vec!["https://www.example.test/a".to_string()];
        let urls = filter_and_dedup(locs, &base());
        assert_eq!(urls.len(), 1);

        let www_base = Url::parse("https://www.example.test/").unwrap();
        let locs = vec!["https://example.test/a".to_string()];
        assert_eq!(filter_and_dedup(locs, &www_base).len(), 1);
    }

    #[test]
    fn test_filter_drops_relative_entries() {
        let locs = vec!["/just/a/path".to_string()];
        assert!(filter_and_dedup(locs, &base()).is_empty());
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_and_dedup(Vec::new(), &base()).is_empty());
    }
}
