//! Brand name and description extraction.
//!
//! Each field is resolved by an ordered list of strategies; the first one
//! that yields a non-empty trimmed value wins. The chains mirror how sites
//! actually declare identity: Open Graph tags first, then classic HTML,
//! then derivation from the URL itself.

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::fetch::PageFetcher;

/// Brand name reserved for pages that could not be scraped.
pub const SENTINEL_BRAND_NAME: &str = "Unknown";
/// Description reserved for pages that could not be scraped.
pub const SENTINEL_DESCRIPTION: &str = "Could not fetch description";
/// Description used when a page is reachable HTML but offers no usable text.
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Outcome of a scrape. Both fields are always present and non-empty.
///
/// ```
/// use brandscope_scrape::ExtractionResult;
///
/// let miss = ExtractionResult::sentinel();
/// assert!(miss.is_sentinel());
/// assert_eq!(miss.brand_name, "Unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub brand_name: String,
    pub description: String,
}

impl ExtractionResult {
    /// The reserved pair meaning "could not scrape". This is the single
    /// authoritative definition; admissibility checks compare against it
    /// rather than re-spelling the literals.
    pub fn sentinel() -> Self {
        Self {
            brand_name: SENTINEL_BRAND_NAME.to_string(),
            description: SENTINEL_DESCRIPTION.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }
}

/// Fetches a page and extracts its brand metadata.
///
/// `extract` never fails: each failure mode converts to the sentinel result
/// and the reason is logged, so callers never have to distinguish transport
/// errors from parse misses.
pub struct MetadataExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl MetadataExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "scrape.url_rejected");
                return ExtractionResult::sentinel();
            }
        };

        let page = match self.fetcher.fetch(&parsed).await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(url = %parsed, error = %err, "scrape.fetch_failed");
                return ExtractionResult::sentinel();
            }
        };

        if !is_html(page.content_type.as_deref()) {
            tracing::warn!(
                url = %parsed,
                content_type = ?page.content_type,
                "scrape.not_html"
            );
            return ExtractionResult::sentinel();
        }

        let result = extract_from_html(&page.body, &parsed);
        tracing::info!(url = %parsed, brand_name = %result.brand_name, "scrape.extracted");
        result
    }
}

/// `text/html` must appear somewhere in the declared type; parameters such
/// as `; charset=utf-8` are tolerated.
fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

fn extract_from_html(body: &str, url: &Url) -> ExtractionResult {
    let document = Html::parse_document(body);

    let brand_name = meta_content(&document, "meta[property='og:site_name']")
        .or_else(|| title_text(&document))
        .unwrap_or_else(|| host_fallback(url));

    let description = meta_content(&document, "meta[name='description']")
        .or_else(|| meta_content(&document, "meta[property='og:description']"))
        .or_else(|| first_paragraph(&document))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    ExtractionResult {
        brand_name,
        description,
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn title_text(document: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `<p>` in document order whose trimmed text is non-empty.
/// Whitespace-only paragraphs are skipped, not taken as a miss.
fn first_paragraph(document: &Html) -> Option<String> {
    let sel = Selector::parse("p").ok()?;
    document
        .select(&sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|s| !s.is_empty())
}

/// Last-resort brand name: the URL's host, or for host-less URLs whatever
/// sits between the scheme and the first `/`.
fn host_fallback(url: &Url) -> String {
    if let Some(host) = url.host_str() {
        return host.to_string();
    }
    let s = url.as_str();
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);
    rest.split('/').next().unwrap_or(rest).to_string()
}
