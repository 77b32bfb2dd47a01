//! Error types for metadata fetches
//!
//! Fetch failures never reach lookup callers; the cache absorbs them and
//! keeps serving the last good snapshot. They exist so the refresh cycle
//! and its decorators can log and count what went wrong.

use thiserror::Error;

/// Result type for metadata source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors from the metadata source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("metadata service unavailable: {0}")]
    Unavailable(String),

    #[error("metadata request timed out")]
    Timeout,

    #[error("metadata service returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("failed to decode metadata payload: {0}")]
    Decode(String),

    #[error("invalid metadata endpoint: {0}")]
    InvalidEndpoint(String),
}

impl SourceError {
    /// Wrap a non-2xx upstream response
    #[must_use]
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            body: body.into(),
        }
    }

    /// Short label for metrics and log fields
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Timeout => "timeout",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Decode(_) => "decode",
            Self::InvalidEndpoint(_) => "invalid_endpoint",
        }
    }

    /// The upstream HTTP status, where one was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
