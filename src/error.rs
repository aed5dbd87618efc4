//! Error types for the cache protocol client
//!
//! A key that is not present is never an error: lookups return `Ok(None)`.
//! Everything here is a real failure of the transport, the codec, the
//! protocol exchange, or the server.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // Connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("no response within {0:?}")]
    Timeout(Duration),

    // Serialization
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to decode message: {0}")]
    Decode(#[from] prost::DecodeError),

    // Protocol
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: u64, limit: usize },

    #[error("message carried neither a request nor a response")]
    EmptyMessage,

    #[error("expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid server descriptor: {0}")]
    InvalidServer(String),

    // Application
    #[error("locator reported no available servers")]
    NoServersAvailable,

    #[error("server rejected handshake for protocol version {major}.{minor}")]
    HandshakeRejected { major: u32, minor: u32 },

    #[error("server error {code}: {message}")]
    Server { code: u32, message: String },
}

/// Failures of the value serialization service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("no codec registered for type {0}")]
    CodecNotRegistered(&'static str),

    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid integer key {0:?}")]
    InvalidKey(String),
}
