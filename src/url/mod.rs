//! URL handling module for Stoker
//!
//! This module provides the host comparison used by sitemap discovery to
//! keep a target's own URLs and reject third-party `<loc>` entries.

use url::Url;

/// Extracts a comparison key for a URL's host
///
/// The host is lowercased and a leading `www.` is stripped, so
/// `https://WWW.Example.com` and `https://example.com` compare equal.
///
/// # Arguments
///
/// * `url` - The URL to extract the host key from
///
/// # Returns
///
/// * `Some(String)` - The normalized host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use stoker::url::host_key;
///
/// let url = Url::parse("https://www.Example.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    url.host_str().map(|h| {
        let host = h.to_lowercase();
        match host.strip_prefix("www.") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => host,
        }
    })
}

/// Returns true when two URLs belong to the same site
///
/// Comparison is by normalized host ([`host_key`]); scheme, port, and path
/// are ignored. URLs without a host never match anything.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use stoker::url::same_site;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = Url::parse("https://www.example.com/article").unwrap();
/// let other = Url::parse("https://other.test/article").unwrap();
/// assert!(same_site(&base, &page));
/// assert!(!same_site(&base, &other));
/// ```
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}
