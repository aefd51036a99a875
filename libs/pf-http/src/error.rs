use std::time::Duration;
use thiserror::Error;

/// HTTP client error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// Base URL or request path does not form a valid absolute URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request building failed
    #[error("Failed to build request: {0}")]
    Request(#[from] http::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport error (DNS, connect, reset, ...)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS configuration error
    #[error("TLS error: {0}")]
    Tls(String),

    /// HTTP non-2xx status
    #[error("HTTP {status}: {body_preview}")]
    Status {
        status: http::StatusCode,
        body_preview: String,
    },

    /// Request or response JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    /// `true` when the server answered with a non-2xx status.
    ///
    /// Everything else (timeouts, transport, TLS) means no definitive answer
    /// was received.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Status code of a [`HttpError::Status`] error.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
