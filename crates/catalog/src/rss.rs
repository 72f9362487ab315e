// ABOUTME: RSS reading for channel descriptions and feed item links.
// ABOUTME: Maps feed-rs output to a small RssChannel and derives item ids from links.

use feed_rs::model::{Entry, Link};
use url::Url;

use crate::error::FeedError;
use crate::html_utils::{br2nl, strip_html};

/// The parts of an RSS channel the adapters care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssChannel {
    pub title: String,
    /// Plain-text description, or None if the feed has none.
    pub description: Option<String>,
    /// Item links in feed order.
    pub item_links: Vec<String>,
}

/// Parses RSS (or Atom) bytes.
pub fn parse_rss(data: &[u8]) -> Result<RssChannel, FeedError> {
    let parsed = feed_rs::parser::parse(data).map_err(FeedError::parse)?;

    let description = parsed
        .description
        .map(|d| strip_html(&br2nl(&d.content)))
        .filter(|d| !d.is_empty());

    Ok(RssChannel {
        title: parsed.title.map(|t| t.content).unwrap_or_default(),
        description,
        item_links: parsed.entries.iter().filter_map(extract_item_url).collect(),
    })
}

/// Prefers link with rel="alternate", otherwise the first link.
fn extract_item_url(entry: &Entry) -> Option<String> {
    let alternate = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"));
    alternate
        .or_else(|| entry.links.first())
        .map(|l: &Link| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Derives an item id from a page link: the last path segment without `suffix`.
///
/// `https://www.zdf.de/politik/frontal/frontal-vom-4-mai-2021-100.html` gives
/// `frontal-vom-4-mai-2021-100` for suffix ".html".
pub fn item_id_from_link(link: &str, suffix: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let id = last.strip_suffix(suffix).unwrap_or(last);
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}
