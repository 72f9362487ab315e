// ABOUTME: Error types for cached HTTP fetching.
// ABOUTME: Provides FetchError with Transport, Io, InvalidUrl and UnknownCacheKind variants.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a resource or touching the cache.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced an HTTP response (DNS, TLS, connect, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading a cached artifact failed.
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A cache kind name that is not part of the TTL table.
    #[error("unknown cache kind: {0}")]
    UnknownCacheKind(String),
}

impl FetchError {
    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the failure happened below HTTP (no status code was received).
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}
