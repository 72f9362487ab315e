// ABOUTME: Error types for publisher adapters and RSS parsing.
// ABOUTME: Provides AdapterError with an ErrorCode taxonomy, plus FeedError for RSS documents.

use std::fmt;

use mediathek_fetch::FetchError;
use thiserror::Error;

use crate::models::Publisher;

/// Error codes representing the categories of adapter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad id, or an upstream payload without the required fields.
    NotFound,
    /// A URL outside the publisher's known host/path shape.
    UnsupportedUrl,
    /// The publisher does not offer this operation.
    Unsupported,
    /// The adapter does not provide a self-check fixture.
    Unimplemented,
    /// Authentication failed again after the one allowed token refresh.
    AuthExhausted,
    /// The API answered with an explicit error envelope (stale query hash, schema change).
    ProtocolDrift,
    /// Transport failure, non-2xx status or a non-JSON body.
    UpstreamUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "not found or malformed",
            ErrorCode::UnsupportedUrl => "unsupported URL",
            ErrorCode::Unsupported => "unsupported operation",
            ErrorCode::Unimplemented => "not implemented",
            ErrorCode::AuthExhausted => "authentication exhausted",
            ErrorCode::ProtocolDrift => "protocol drift",
            ErrorCode::UpstreamUnavailable => "upstream unavailable",
        };
        write!(f, "{}", s)
    }
}

/// The error returned by every adapter operation.
///
/// Carries the publisher and the id or URL being worked on, so failures stay
/// attributable when several adapters run side by side.
#[derive(Debug)]
pub struct AdapterError {
    pub code: ErrorCode,
    pub publisher: Publisher,
    pub context: String,
    pub source: Option<anyhow::Error>,
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter {}: {}: {}", self.publisher, self.code, self.context)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl AdapterError {
    pub fn new(
        code: ErrorCode,
        publisher: Publisher,
        context: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            publisher,
            context: context.into(),
            source,
        }
    }

    /// Create a NotFound error.
    pub fn not_found(publisher: Publisher, context: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::NotFound, publisher, context, source)
    }

    /// Create an UnsupportedUrl error.
    pub fn unsupported_url(publisher: Publisher, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UnsupportedUrl,
            publisher,
            url,
            Some(anyhow::anyhow!(reason.into())),
        )
    }

    /// Create an Unsupported error for an operation this publisher lacks.
    pub fn unsupported(publisher: Publisher, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unsupported, publisher, op, None)
    }

    /// Create an Unimplemented error.
    pub fn unimplemented(publisher: Publisher, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unimplemented, publisher, op, None)
    }

    /// Create an AuthExhausted error.
    pub fn auth_exhausted(publisher: Publisher, context: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::AuthExhausted, publisher, context, source)
    }

    /// Create a ProtocolDrift error.
    pub fn protocol_drift(publisher: Publisher, context: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::ProtocolDrift, publisher, context, source)
    }

    /// Create an UpstreamUnavailable error.
    pub fn upstream(publisher: Publisher, context: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, publisher, context, source)
    }

    /// Wrap a fetch failure as UpstreamUnavailable.
    pub fn from_fetch(publisher: Publisher, context: impl Into<String>, err: FetchError) -> Self {
        Self::upstream(publisher, context, Some(anyhow::Error::new(err)))
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_unsupported_url(&self) -> bool {
        self.code == ErrorCode::UnsupportedUrl
    }

    pub fn is_unsupported(&self) -> bool {
        self.code == ErrorCode::Unsupported
    }

    pub fn is_unimplemented(&self) -> bool {
        self.code == ErrorCode::Unimplemented
    }

    pub fn is_auth_exhausted(&self) -> bool {
        self.code == ErrorCode::AuthExhausted
    }

    pub fn is_protocol_drift(&self) -> bool {
        self.code == ErrorCode::ProtocolDrift
    }

    pub fn is_upstream(&self) -> bool {
        self.code == ErrorCode::UpstreamUnavailable
    }
}

/// Result alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur while parsing an RSS document.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Failed to parse the feed data (malformed XML).
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// The data was parsed but is not usable as a channel feed.
    #[error("invalid feed: {0}")]
    Invalid(String),
}

impl FeedError {
    /// Creates a Parse error from an underlying feed-rs error.
    pub fn parse(err: impl fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }

    /// Creates an Invalid error with a custom message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        FeedError::Invalid(msg.into())
    }
}
