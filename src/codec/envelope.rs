//! Length-prefixed MessagePack envelopes.
//!
//! Every logical message travels as one envelope: a 4-byte big-endian body
//! length followed by the MessagePack body. [`EnvelopeDeserializer`]
//! implements a state machine over a single `BytesMut` buffer for handling
//! fragmented reads:
//! - `WaitingForHeader`: need at least 4 bytes
//! - `WaitingForBody`: length parsed, need N more body bytes
//!
//! Unlike a drain-everything parser, one call decodes at most one message;
//! further complete messages stay buffered until surfaced by `try_take`,
//! which is what lets the reassembly loop preserve arrival order across
//! coalesced chunks.

use std::marker::PhantomData;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::msgpack::MsgPackCodec;
use super::ResponseDeserializer;
use crate::error::{GraphwireError, Result};

/// Size of the envelope length prefix in bytes.
pub const ENVELOPE_HEADER_SIZE: usize = 4;

/// Default maximum envelope body size (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u32 = 10 * 1024 * 1024;

/// State machine for envelope parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for the complete length prefix.
    WaitingForHeader,
    /// Length parsed, waiting for body bytes.
    WaitingForBody { remaining: u32 },
}

/// Encode a value as one envelope: length prefix plus MessagePack body.
pub fn encode_envelope<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let body = MsgPackCodec::encode(value)?;
    if body.len() > u32::MAX as usize {
        return Err(GraphwireError::Protocol(format!(
            "envelope body length {} does not fit the length prefix",
            body.len()
        )));
    }

    let mut envelope = Vec::with_capacity(ENVELOPE_HEADER_SIZE + body.len());
    envelope.extend_from_slice(&(body.len() as u32).to_be_bytes());
    envelope.extend_from_slice(&body);
    Ok(envelope)
}

/// Stateful decode session over envelopes carrying messages of type `M`.
///
/// Owns the accumulation buffer for exactly one connection; never share a
/// session across connections, and call [`clear`](Self::clear) before
/// reusing one for an independent exchange. All data is stored in a single
/// `BytesMut` to minimize allocations.
pub struct EnvelopeDeserializer<M> {
    /// Accumulated bytes from transport reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed body size.
    max_body_size: u32,
    _message: PhantomData<fn() -> M>,
}

impl<M> EnvelopeDeserializer<M> {
    /// Create a session with the default body size limit.
    pub fn new() -> Self {
        Self::with_max_body_size(DEFAULT_MAX_BODY_SIZE)
    }

    /// Create a session with a custom body size limit.
    pub fn with_max_body_size(max_body_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForHeader,
            max_body_size,
            _message: PhantomData,
        }
    }

    /// Number of buffered, not yet consumed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no pending bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard buffered bytes and reset the parsing state.
    ///
    /// Partial, not-yet-complete messages are dropped, never emitted.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForBody { .. } => "WaitingForBody",
        }
    }
}

impl<M> EnvelopeDeserializer<M>
where
    M: DeserializeOwned,
{
    /// Try to decode a single message from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(message))` if one complete envelope was consumed
    /// - `Ok(None)` if more bytes are needed
    /// - `Err(..)` on a codec fault (oversized or undecodable body)
    fn try_decode_one(&mut self) -> Result<Option<M>> {
        match self.state {
            State::WaitingForHeader => {
                if self.buffer.len() < ENVELOPE_HEADER_SIZE {
                    return Ok(None);
                }

                let mut prefix = [0u8; ENVELOPE_HEADER_SIZE];
                prefix.copy_from_slice(&self.buffer[..ENVELOPE_HEADER_SIZE]);
                let length = u32::from_be_bytes(prefix);

                if length > self.max_body_size {
                    return Err(GraphwireError::FrameTooLarge {
                        length,
                        limit: self.max_body_size,
                    });
                }
                if length == 0 {
                    return Err(GraphwireError::Protocol(
                        "zero-length envelope body".to_string(),
                    ));
                }

                let _ = self.buffer.split_to(ENVELOPE_HEADER_SIZE);
                self.state = State::WaitingForBody { remaining: length };

                // The body may already be buffered in full.
                self.try_decode_one()
            }

            State::WaitingForBody { remaining } => {
                let remaining = remaining as usize;

                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let body = self.buffer.split_to(remaining);
                self.state = State::WaitingForHeader;

                let message = MsgPackCodec::decode(&body)?;
                Ok(Some(message))
            }
        }
    }
}

impl<M> ResponseDeserializer for EnvelopeDeserializer<M>
where
    M: DeserializeOwned,
{
    type Message = M;

    fn feed(&mut self, chunk: &[u8]) -> Result<Option<M>> {
        self.buffer.extend_from_slice(chunk);
        self.try_decode_one()
    }

    fn try_take(&mut self) -> Result<Option<M>> {
        self.try_decode_one()
    }
}

impl<M> Default for EnvelopeDeserializer<M> {
    fn default() -> Self {
        Self::new()
    }
}
