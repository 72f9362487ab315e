// ABOUTME: The CachedFetcher that performs blocking HTTP GETs behind a flat-file cache.
// ABOUTME: Fresh cache entries stand in for the network; failed responses are never cached.

use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::cache::{sanitize_cache_key, CacheKind, CacheStore};
use crate::error::FetchError;
use crate::options::Options;

/// Status reported for bodies served from the cache.
const CACHE_HIT_STATUS: u16 = 200;

/// A response body plus the status it came with.
///
/// Cache hits carry a synthetic 200, so a hit looks exactly like a live success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    /// True for statuses below 400.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Blocking HTTP client with a transparent TTL cache in front of it.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    http: Client,
    store: CacheStore,
}

impl CachedFetcher {
    /// Create a fetcher from options. See [`crate::FetcherBuilder`].
    pub fn new(opts: Options) -> Result<Self, FetchError> {
        let redirect = if opts.follow_redirects {
            Policy::limited(10)
        } else {
            Policy::none()
        };
        let http = Client::builder()
            .user_agent(opts.user_agent)
            .timeout(opts.timeout)
            .redirect(redirect)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            store: CacheStore::new(opts.cache_dir),
        })
    }

    /// Start configuring a new fetcher.
    pub fn builder() -> crate::FetcherBuilder {
        crate::FetcherBuilder::new()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Fetch `url`, serving a cached copy younger than `max_age` when one exists.
    ///
    /// With no cache key (or one that sanitizes to nothing) every call goes to
    /// the network and nothing is stored. Live responses with status >= 400 are
    /// returned for diagnostics but never written to the cache. A failed cache
    /// write is logged and otherwise ignored.
    pub fn fetch(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        cache_key: Option<&str>,
        max_age: Duration,
    ) -> Result<FetchResponse, FetchError> {
        let key = cache_key
            .map(sanitize_cache_key)
            .filter(|key| !key.is_empty());

        if let Some(ref key) = key {
            match self.store.read_fresh(key, max_age) {
                Ok(Some(body)) => {
                    tracing::debug!(%url, cache_key = %key, "cache hit");
                    return Ok(FetchResponse {
                        status: CACHE_HIT_STATUS,
                        body: Bytes::from(body),
                    });
                }
                Ok(None) => tracing::debug!(%url, cache_key = %key, "cache miss"),
                Err(e) => tracing::warn!(%url, cache_key = %key, error = %e, "cache read failed"),
            }
        }

        let response = self.get(url, headers)?;

        match key {
            Some(key) if response.is_success() => {
                if let Err(e) = self.store.write(&key, &response.body) {
                    tracing::warn!(%url, cache_key = %key, error = %e, "cache write failed");
                } else {
                    tracing::debug!(%url, cache_key = %key, "cached response");
                }
            }
            Some(key) => {
                tracing::debug!(%url, cache_key = %key, status = response.status, "not caching failed response");
            }
            None => {}
        }

        Ok(response)
    }

    /// Fetch with the freshness window of a [`CacheKind`].
    pub fn fetch_kind(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        cache_key: &str,
        kind: CacheKind,
    ) -> Result<FetchResponse, FetchError> {
        self.fetch(url, headers, Some(cache_key), kind.max_age())
    }

    /// Drop the cached copy for `cache_key` so the next fetch goes to the network.
    pub fn invalidate(&self, cache_key: &str) {
        let key = sanitize_cache_key(cache_key);
        if key.is_empty() {
            return;
        }
        if let Err(e) = self.store.remove(&key) {
            tracing::warn!(cache_key = %key, error = %e, "cache invalidation failed");
        } else {
            tracing::debug!(cache_key = %key, "cache entry invalidated");
        }
    }

    /// Uncached GET, used for pages that must always be read live.
    pub fn fetch_live(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse, FetchError> {
        self.fetch(url, headers, None, Duration::ZERO)
    }

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::invalid_url(url, e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::invalid_url(url, "scheme must be http or https"));
        }

        let mut request = self.http.get(parsed);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport)?;

        Ok(FetchResponse { status, body })
    }
}
