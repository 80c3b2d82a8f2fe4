//! Error types for graphwire.

use thiserror::Error;

/// Main error type for all graphwire operations.
///
/// These are crate-level faults (I/O, codec, framing). Protocol-level
/// failure classification - the `{status, message, exceptionKind}` triple a
/// client ultimately sees - lives in [`GraphError`](crate::protocol::GraphError)
/// and is derived from these wherever a wire fault must be surfaced to an
/// exchange.
#[derive(Debug, Error)]
pub enum GraphwireError {
    /// I/O error while reading the response byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MessagePack serialization error (outbound envelope bodies).
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack deserialization error (inbound envelope bodies).
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Envelope declared a body larger than the configured limit.
    ///
    /// Classified as 413 `RequestEntityTooLarge` at the protocol level.
    #[error("envelope body length {length} exceeds maximum {limit}")]
    FrameTooLarge { length: u32, limit: u32 },

    /// Structural envelope violation (e.g. zero-length body).
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using GraphwireError.
pub type Result<T> = std::result::Result<T, GraphwireError>;
