//! Error types for the OSC eye-tracking bridge

use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OSC decoding errors. Every variant means "drop the packet".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Address does not start with '/'")]
    MissingAddress,

    #[error("Missing ',' type tag after address")]
    MissingTypeTag,

    #[error("Type tag string is empty")]
    NoPayload,

    #[error("Unsupported type tag: '{0}'")]
    UnsupportedTag(char),

    #[error("Packet truncated at offset {0}")]
    Truncated(usize),

    #[error("Token is not valid UTF-8")]
    InvalidText,
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed on {addr}: {source}")]
    BindFailed {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn receive thread: {0}")]
    SpawnFailed(std::io::Error),

    #[error("Listener has been stopped")]
    Stopped,

    #[error("Listener cannot be stopped or rebound from its own receive thread")]
    CalledFromWorker,

    #[error("Packet handler was lost when the receive thread panicked")]
    HandlerLost,
}

/// Settings update errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown config field: {0}")]
    UnknownField(String),

    #[error("Value for {field} has the wrong type: {value}")]
    TypeMismatch { field: String, value: String },
}

/// Result type alias for the bridge
pub type Result<T> = std::result::Result<T, Error>;
