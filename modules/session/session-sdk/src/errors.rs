//! Error types for the session SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server answered and refused the token.
    #[error("Token rejected with status {status}")]
    Rejected { status: u16 },

    /// No answer from the server (network, timeout, TLS).
    #[error("Profile service unreachable: {0}")]
    Unavailable(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    #[must_use]
    pub fn rejected(status: u16) -> Self {
        Self::Rejected { status }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// `true` when the server definitively refused the credential.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
