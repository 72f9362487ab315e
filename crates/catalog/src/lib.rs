// ABOUTME: Library entry point for the German public broadcaster catalog adapters.
// ABOUTME: Re-exports the catalog models, the Adapter trait, the ARD and ZDF adapters and SelfCheck.

//! Normalizes the ARD and ZDF Mediathek APIs into one catalog model.
//!
//! Every publisher implements [`Adapter`]. Adapters fetch through a
//! [`mediathek_fetch::CachedFetcher`], so repeated reads within a cache
//! window never touch the network.
//!
//! ```no_run
//! use mediathek_catalog::{adapter_for, AdapterConfig, Publisher};
//! use mediathek_fetch::CachedFetcher;
//!
//! let fetcher = CachedFetcher::builder().cache_dir("./cache").build()?;
//! let ard = adapter_for(Publisher::Ard, fetcher, &AdapterConfig::default());
//! let item = ard.read_item_by_url("https://www.ardmediathek.de/ard/player/Y3JpZDovL2Rhc2Vyc3RlLmRl")?;
//! println!("{} ({} streams)", item.title, item.media.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessibility;
pub mod adapter;
pub mod adapters;
pub mod duration_parse;
pub mod error;
pub mod html_utils;
pub mod image_utils;
pub mod legacy;
pub mod models;
pub mod rss;
pub mod self_check;
pub mod time_parse;
pub mod title;

pub use accessibility::ChannelItemsOptions;
pub use adapter::Adapter;
pub use adapters::ard::{ArdAdapter, ArdEndpoints};
pub use adapters::zdf::{ZdfAdapter, ZdfEndpoints};
pub use adapters::{adapter_for, publisher_for_url, AdapterConfig};
pub use error::{AdapterError, ErrorCode, FeedError, Result};
pub use legacy::{apply_legacy_data, LegacyLookup, LegacyRecord, StaticLegacyTable};
pub use models::{
    Channel, ChannelRef, ChannelWithItems, ImageSet, ImageVariant, Item, MediaVariant, Publisher,
};
pub use self_check::{adapter_is_working, HealthReport, HealthSubject};
