// ABOUTME: Configuration options for the cached fetcher.
// ABOUTME: FetcherBuilder provides a fluent API for constructing CachedFetcher instances.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::CachedFetcher;
use crate::error::FetchError;

/// The fixed desktop-browser user agent sent with every live request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_3) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.0.3 Safari/605.1.15";

/// Configuration options for a CachedFetcher.
#[derive(Debug, Clone)]
pub struct Options {
    pub cache_dir: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            follow_redirects: true,
        }
    }
}

/// Builder for constructing CachedFetcher instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct FetcherBuilder {
    opts: Options,
}

impl FetcherBuilder {
    /// Create a new FetcherBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory cached artifacts are stored in.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.cache_dir = dir.into();
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Follow HTTP redirects (on by default).
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.opts.follow_redirects = follow;
        self
    }

    /// Build the fetcher with the configured options.
    pub fn build(self) -> Result<CachedFetcher, FetchError> {
        CachedFetcher::new(self.opts)
    }
}
