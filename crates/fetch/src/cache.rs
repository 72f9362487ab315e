// ABOUTME: Flat-file response cache keyed by sanitized identifiers.
// ABOUTME: Provides CacheKind TTL policy, CacheStore persistence and cache key sanitizing.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FetchError;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// The artifact types that may be cached, each with a fixed freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// RSS feeds and first feed pages. Cheap to refetch.
    Feed,
    /// Item metadata. Typos get corrected upstream now and then.
    Item,
    /// Channel metadata.
    Channel,
    /// Stream lists resolved from a media template.
    ItemMedia,
    ChannelMeta,
    ChannelMeta2,
    /// A full channel catalog document.
    Channels,
    /// One alphabet partition of a channel catalog.
    ChannelList,
}

impl CacheKind {
    /// All kinds in the TTL table.
    pub const ALL: [CacheKind; 8] = [
        CacheKind::Feed,
        CacheKind::Item,
        CacheKind::Channel,
        CacheKind::ItemMedia,
        CacheKind::ChannelMeta,
        CacheKind::ChannelMeta2,
        CacheKind::Channels,
        CacheKind::ChannelList,
    ];

    /// Maximum age for a cached artifact of this kind.
    pub fn max_age(self) -> Duration {
        let secs = match self {
            CacheKind::Feed => HOUR,
            CacheKind::Item => 14 * DAY,
            CacheKind::Channel
            | CacheKind::ItemMedia
            | CacheKind::ChannelMeta
            | CacheKind::ChannelMeta2
            | CacheKind::Channels
            | CacheKind::ChannelList => 7 * DAY,
        };
        Duration::from_secs(secs)
    }

    /// The short name used in cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKind::Feed => "feed",
            CacheKind::Item => "item",
            CacheKind::Channel => "channel",
            CacheKind::ItemMedia => "itemmedia",
            CacheKind::ChannelMeta => "channelmeta",
            CacheKind::ChannelMeta2 => "channelmeta2",
            CacheKind::Channels => "channels",
            CacheKind::ChannelList => "channel-list",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FetchError::UnknownCacheKind(s.to_string()))
    }
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Typographic entities and punctuation removed from cache keys.
/// Entities come first so their '&', '#' and ';' are not stripped piecemeal.
const STRIP: &[&str] = &[
    "&#8216;", "&#8217;", "&#8220;", "&#8221;", "&#8211;", "&#8212;", "\u{2014}", "\u{2013}", "~",
    "`", "!", "@", "#", "$", "%", "^", "&", "*", "(", ")", "=", "+", "[", "{", "]", "}", "\\",
    "|", ";", ":", "\"", "'", ",", "<", ".", ">", "/", "?",
];

/// Turns an arbitrary identifier into a safe file name.
///
/// Path separators become underscores, markup and punctuation are removed,
/// and whitespace runs collapse to a single dash. A short alphanumeric
/// extension (".json", ".rss") survives so artifacts stay recognizable.
pub fn sanitize_cache_key(key: &str) -> String {
    let (stem, ext) = split_extension(key);
    let mut out = sanitize_stem(stem);
    if let Some(ext) = ext {
        if !out.is_empty() {
            out.push('.');
            out.push_str(ext);
        }
    }
    out
}

fn split_extension(key: &str) -> (&str, Option<&str>) {
    if let Some((stem, ext)) = key.rsplit_once('.') {
        if !stem.is_empty()
            && (1..=4).contains(&ext.len())
            && ext.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return (stem, Some(ext));
        }
    }
    (key, None)
}

fn sanitize_stem(s: &str) -> String {
    let s = s.replace('/', "_").replace('|', "__");
    let mut s = TAG_RE.replace_all(&s, "").into_owned();
    for pattern in STRIP {
        s = s.replace(pattern, "");
    }
    WHITESPACE_RE.replace_all(s.trim(), "-").into_owned()
}

/// One directory of cached response bodies, one file per sanitized key.
///
/// There is no locking; concurrent writers to the same key race and the last
/// write wins.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for an already sanitized key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Returns the cached body if it exists and is no older than `max_age`.
    pub fn read_fresh(&self, key: &str, max_age: Duration) -> Result<Option<Vec<u8>>, FetchError> {
        let path = self.path_for(key);
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FetchError::Io { path, source: e }),
        };

        let modified = metadata
            .modified()
            .map_err(|e| FetchError::Io { path: path.clone(), source: e })?;
        // A modification time in the future counts as brand new.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age > max_age {
            return Ok(None);
        }

        fs::read(&path)
            .map(Some)
            .map_err(|e| FetchError::Io { path, source: e })
    }

    /// Writes (or overwrites) the artifact for `key`.
    pub fn write(&self, key: &str, body: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), body)
    }

    /// Deletes the artifact for `key`. A missing entry is not an error.
    pub fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
