// ABOUTME: Cached HTTP fetching for slow, rate-limited upstream APIs.
// ABOUTME: Re-exports the public API: CachedFetcher, FetcherBuilder, CacheKind, CacheStore, FetchError.

//! A single blocking fetch function with a flat-file TTL cache in front of it.
//!
//! # Example
//!
//! ```no_run
//! use mediathek_fetch::{CacheKind, CachedFetcher};
//!
//! let fetcher = CachedFetcher::builder().cache_dir("cache").build()?;
//! let res = fetcher.fetch_kind("https://www.zdf.de/rss/zdf/nachrichten", &[], "zdf_feed_nachrichten.rss", CacheKind::Feed)?;
//! println!("{} bytes", res.body.len());
//! # Ok::<(), mediathek_fetch::FetchError>(())
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod options;

pub use crate::cache::{sanitize_cache_key, CacheKind, CacheStore};
pub use crate::client::{CachedFetcher, FetchResponse};
pub use crate::error::FetchError;
pub use crate::options::{FetcherBuilder, Options, DEFAULT_USER_AGENT};
