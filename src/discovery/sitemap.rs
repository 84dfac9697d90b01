//! Sitemap XML parsing
//!
//! Handles the two sitemap dialects a deployment may serve:
//! - `<sitemapindex>` documents whose `<sitemap><loc>` entries point at
//!   child sitemaps
//! - flat `<urlset>` documents whose `<url><loc>` entries are page URLs

use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed sitemap document, tagged by dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A sitemap index: the contained URLs are child sitemap locations
    Index(Vec<String>),

    /// A flat urlset: the contained URLs are page locations
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    /// Returns the `<loc>` values regardless of dialect
    pub fn locs(&self) -> &[String] {
        match self {
            SitemapDocument::Index(locs) => locs,
            SitemapDocument::UrlSet(locs) => locs,
        }
    }
}

/// Parses sitemap XML into a [`SitemapDocument`]
///
/// The root element decides the dialect: `<sitemapindex>` yields
/// [`SitemapDocument::Index`], anything else (including `<urlset>` and
/// documents with no recognized root) yields [`SitemapDocument::UrlSet`].
/// An empty or loc-less document parses to an empty list rather than an
/// error; only malformed XML fails.
///
/// Element names are matched by suffix so namespace prefixes do not matter.
pub fn parse_sitemap(xml: &[u8]) -> Result<SitemapDocument, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs: Vec<String> = Vec::new();
    let mut saw_index_root = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if e.name().as_ref().ends_with(b"sitemapindex") {
                    saw_index_root = true;
                } else if e.name().as_ref().ends_with(b"loc") {
                    in_loc = true;
                }
            }
            Event::End(e) => {
                if e.name().as_ref().ends_with(b"loc") {
                    in_loc = false;
                }
            }
            Event::Text(t) => {
                if in_loc {
                    let text = t.unescape()?.trim().to_string();
                    if !text.is_empty() {
                        locs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if saw_index_root {
        Ok(SitemapDocument::Index(locs))
    } else {
        Ok(SitemapDocument::UrlSet(locs))
    }
}
