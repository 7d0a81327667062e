//! Error types for thinker.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for thinker.
#[derive(Debug, Error)]
pub enum ThinkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Completion did not match any recognized template: {0}")]
    ParseFailure(String),

    #[error("Answer does not address the question: {0}")]
    Inconsistent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThinkerError {
    /// Whether the transport may retry this failure at the connection level.
    ///
    /// Only network-level failures qualify; non-success statuses and malformed
    /// bodies are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

/// Result type alias for thinker.
pub type Result<T> = std::result::Result<T, ThinkerError>;
