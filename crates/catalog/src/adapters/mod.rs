// ABOUTME: Publisher adapter registry.
// ABOUTME: Builds the right Adapter for a Publisher and recognizes publisher page URLs.

pub mod ard;
pub mod zdf;

use std::path::PathBuf;
use std::sync::Arc;

use mediathek_fetch::CachedFetcher;
use url::Url;

use crate::adapter::Adapter;
use crate::legacy::LegacyLookup;
use crate::models::Publisher;

use self::ard::{ArdAdapter, ArdEndpoints, ARD_WEB_HOST};
use self::zdf::{ZdfAdapter, ZdfEndpoints, DEFAULT_TOKEN_FILE};

/// Settings shared by [`adapter_for`].
#[derive(Clone)]
pub struct AdapterConfig {
    pub ard: ArdEndpoints,
    pub zdf: ZdfEndpoints,
    pub zdf_token_file: PathBuf,
    pub legacy: Option<Arc<dyn LegacyLookup>>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            ard: ArdEndpoints::default(),
            zdf: ZdfEndpoints::default(),
            zdf_token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            legacy: None,
        }
    }
}

impl std::fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("ard", &self.ard)
            .field("zdf", &self.zdf)
            .field("zdf_token_file", &self.zdf_token_file)
            .field("legacy", &self.legacy.is_some())
            .finish()
    }
}

/// Creates the adapter for `publisher`.
pub fn adapter_for(publisher: Publisher, fetcher: CachedFetcher, config: &AdapterConfig) -> Box<dyn Adapter> {
    match publisher {
        Publisher::Ard => {
            let mut adapter = ArdAdapter::new(fetcher).with_endpoints(config.ard.clone());
            if let Some(ref legacy) = config.legacy {
                adapter = adapter.with_legacy(Arc::clone(legacy));
            }
            Box::new(adapter)
        }
        Publisher::Zdf => {
            let mut adapter = ZdfAdapter::new(fetcher)
                .with_endpoints(config.zdf.clone())
                .with_token_file(config.zdf_token_file.clone());
            if let Some(ref legacy) = config.legacy {
                adapter = adapter.with_legacy(Arc::clone(legacy));
            }
            Box::new(adapter)
        }
    }
}

/// The publisher whose website serves `url`, by host.
pub fn publisher_for_url(url: &str) -> Option<Publisher> {
    let url = Url::parse(url.trim()).ok()?;
    let host = url.host_str()?;
    if host == ARD_WEB_HOST {
        Some(Publisher::Ard)
    } else if host == "zdf.de" || host.ends_with(".zdf.de") {
        Some(Publisher::Zdf)
    } else {
        None
    }
}
