//! Error types for mllp-link.

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for all mllp-link operations.
#[derive(Debug, Error)]
pub enum MllpError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error (configuration only).
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Protocol error (no frame ready, frame too large, bad delimiters, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Frame payload is not valid in the session charset.
    ///
    /// Fatal for the frame; the connection-level caller decides whether to
    /// close the connection.
    #[error("malformed {charset} data in frame")]
    Decode { charset: &'static str },

    /// Charset label not recognized by the encoding registry.
    #[error("unknown charset label: {0}")]
    UnknownCharset(String),

    /// Backing key/value store failure (fail closed).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias using MllpError.
pub type Result<T> = std::result::Result<T, MllpError>;
