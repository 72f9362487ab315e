// ABOUTME: Normalized catalog models shared by every publisher adapter.
// ABOUTME: Item, MediaVariant, ImageSet, Channel and the Publisher tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MIME type for progressive downloads.
pub const MIME_MP4: &str = "video/mp4";
/// MIME type for adaptive (HLS) streams.
pub const MIME_HLS: &str = "application/x-mpegURL";

/// The publishers an adapter exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Publisher {
    #[serde(rename = "ARD")]
    Ard,
    #[serde(rename = "ZDF")]
    Zdf,
}

impl Publisher {
    pub const ALL: [Publisher; 2] = [Publisher::Ard, Publisher::Zdf];

    pub fn as_str(self) -> &'static str {
        match self {
            Publisher::Ard => "ARD",
            Publisher::Zdf => "ZDF",
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Publisher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Publisher::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown publisher: {}", s))
    }
}

/// One playable encoding of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    /// Absolute URL; protocol-relative upstream URLs are rewritten to https.
    pub url: String,
    pub mime_type: String,
    /// Average bitrate in kbps. `Some(0)` means known to be unknown, `None` means no table entry applied.
    pub bitrate: Option<u32>,
    /// Human label, e.g. "Quality 2".
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// An image in several sizes. Largest first by convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    pub description: Option<String>,
    pub copyright: Option<String>,
    pub variants: Vec<ImageVariant>,
}

impl ImageSet {
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// The show an item belongs to, by reference only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

impl ChannelRef {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

/// A single playable media asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub publisher: String,
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    /// Originating network or service, e.g. "Das Erste".
    pub contributor: String,
    pub geoblocked: Option<bool>,
    /// Seconds.
    pub duration: Option<u32>,
    /// Epoch seconds; may lie in the future for scheduled content.
    pub airtime: Option<i64>,
    pub expires: Option<i64>,
    pub valid_to: Option<i64>,
    pub valid: bool,
    pub hd: bool,
    pub image: ImageSet,
    pub channel: ChannelRef,
    /// May be empty for metadata-only listings such as upcoming broadcasts.
    pub media: Vec<MediaVariant>,
}

/// A show or program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub publisher: String,
    pub contributor: Option<String>,
    pub homepage: Option<String>,
    pub image: ImageSet,
    // Backfilled from the legacy lookup table, never computed here.
    pub short_name: Option<String>,
    pub tags: Vec<String>,
    pub full_episode_length: Option<u32>,
    pub is_new: Option<bool>,
    pub has_no_feed: Option<bool>,
    pub default_image: Option<String>,
}

/// A channel together with the items of its first feed page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelWithItems {
    #[serde(flatten)]
    pub channel: Channel,
    pub items: Vec<Item>,
}
