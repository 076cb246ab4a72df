//! Error types for massager-protocol.
//!
//! Malformed frames and unparseable advertisements are not errors: they
//! decode to `None`. This enum only covers conditions that reach the caller.

use thiserror::Error;

/// Main error type for link, registry and configuration operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport rejected or failed a characteristic write.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No codec registered for the given product id.
    #[error("No codec for product id {0:?}")]
    CodecNotFound(Option<u32>),

    /// The session cannot express this intent for its device family.
    #[error("Unsupported intent: {0}")]
    UnsupportedIntent(&'static str),

    /// The link or its transport channel has been closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using ProtocolError.
pub type Result<T> = std::result::Result<T, ProtocolError>;
