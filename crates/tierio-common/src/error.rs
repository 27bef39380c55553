//! Error types for tierio
//!
//! This module defines the common error types used throughout the system.
//! Errors are `Clone` so a settled metadata operation can hand the same
//! failure back to every caller that asks for it.

use thiserror::Error;

/// Common result type for tierio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for tierio
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Transport errors
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("raw reply already consumed")]
    ReplyConsumed,

    // Naming service errors
    #[error("{op}: {message}")]
    Remote {
        op: &'static str,
        code: u16,
        message: String,
    },

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("RPC timeout")]
    Timeout,

    /// The reply has not arrived yet. Never a terminal state.
    #[error("reply not ready")]
    NotReady,

    // Local errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a translation error
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this is a retryable error
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::Timeout | Self::ConnectionFailed(_)
        )
    }

    /// Check if the operation is merely still pending
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// Protocol error code carried by a remote failure, if any
    #[must_use]
    pub const fn remote_code(&self) -> Option<u16> {
        match self {
            Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::Timeout.is_retryable());
        assert!(Error::ConnectionFailed("reset".into()).is_retryable());
        assert!(!Error::transport("desync").is_retryable());
        assert!(!Error::ReplyConsumed.is_retryable());
    }

    #[test]
    fn test_error_not_ready() {
        assert!(Error::NotReady.is_not_ready());
        assert!(Error::NotReady.is_retryable());
        assert!(!Error::Timeout.is_not_ready());
        assert!(!Error::translation("conflict").is_not_ready());
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::Remote {
            op: "sync",
            code: 8,
            message: "file not found".into(),
        };
        assert_eq!(err.to_string(), "sync: file not found");
        assert_eq!(err.remote_code(), Some(8));
        assert_eq!(Error::NotReady.remote_code(), None);
    }
}
