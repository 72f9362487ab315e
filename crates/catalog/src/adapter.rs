// ABOUTME: The Adapter trait every publisher implements.
// ABOUTME: Required item reads, optional channel operations and the shared readChannelWithItems.

use crate::accessibility::{should_skip_item, ChannelItemsOptions};
use crate::error::{AdapterError, Result};
use crate::models::{Channel, ChannelWithItems, Item, Publisher};

/// A publisher's catalog API, normalized to [`Item`] and [`Channel`].
///
/// Item reads are required. Channel operations default to an `Unsupported`
/// error and the self-check fixtures to `Unimplemented`, so a publisher only
/// overrides what it actually offers.
pub trait Adapter: Send + Sync {
    fn publisher(&self) -> Publisher;

    /// Reads one item by its publisher id.
    fn read_item_by_id(&self, id: &str) -> Result<Item>;

    /// Reads an item from a page URL on the publisher's website.
    ///
    /// URLs outside the publisher's host and path shape fail with
    /// `UnsupportedUrl` before any request is made.
    fn read_item_by_url(&self, url: &str) -> Result<Item>;

    fn read_channel(&self, id: &str) -> Result<Channel> {
        let _ = id;
        Err(AdapterError::unsupported(self.publisher(), "reading a channel"))
    }

    /// Item ids on the first page of a channel's feed.
    fn read_channel_feed(&self, id: &str) -> Result<Vec<String>> {
        let _ = id;
        Err(AdapterError::unsupported(self.publisher(), "reading a channel feed"))
    }

    /// Every channel the publisher lists. May issue many requests.
    fn read_list_of_channels(&self) -> Result<Vec<Channel>> {
        Err(AdapterError::unsupported(self.publisher(), "reading the list of channels"))
    }

    /// An item id known to exist, for health checks.
    fn test_item_id(&self) -> Result<String> {
        Err(AdapterError::unimplemented(self.publisher(), "test item id"))
    }

    /// A channel id known to exist, for health checks.
    fn test_channel_id(&self) -> Result<String> {
        Err(AdapterError::unimplemented(self.publisher(), "test channel id"))
    }

    /// Reads a channel and the items of its feed.
    ///
    /// Items that fail to load are logged and left out. Accessibility
    /// variants are dropped unless `options` asks for them.
    fn read_channel_with_items(&self, id: &str, options: ChannelItemsOptions) -> Result<ChannelWithItems> {
        let channel = self.read_channel(id)?;
        let feed = self.read_channel_feed(id)?;

        let mut items = Vec::with_capacity(feed.len());
        for item_id in feed {
            match self.read_item_by_id(&item_id) {
                Ok(item) if should_skip_item(&item, options) => {
                    tracing::debug!(channel = id, item = %item_id, title = %item.title, "skipping accessibility variant");
                }
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(channel = id, item = %item_id, error = %e, "skipping item that failed to load");
                }
            }
        }

        Ok(ChannelWithItems { channel, items })
    }
}
