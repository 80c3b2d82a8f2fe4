//! Codec module - serialization/deserialization for message bodies.
//!
//! This module provides the byte-level formats and the session contract the
//! reassembly loop is built on:
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (to_vec_named for
//!   cross-runtime compatibility)
//! - [`EnvelopeDeserializer`] - stateful session over length-prefixed
//!   MessagePack envelopes
//! - [`ResponseDeserializer`] - the two-operation contract between a session
//!   and [`ResponseReassembler`](crate::reassembly::ResponseReassembler)
//!
//! # Design
//!
//! The reassembler depends only on [`ResponseDeserializer`], never on a
//! concrete byte format. Swapping the envelope layout means providing a new
//! session type, not touching the reassembly logic.
//!
//! # Example
//!
//! ```
//! use graphwire::codec::{encode_envelope, EnvelopeDeserializer, ResponseDeserializer};
//! use graphwire::protocol::ResponseMessage;
//!
//! let wire = encode_envelope(&ResponseMessage::ok(vec![])).unwrap();
//!
//! let mut session = EnvelopeDeserializer::<ResponseMessage>::new();
//! let message = session.feed(&wire).unwrap().unwrap();
//! assert!(message.is_terminal());
//! ```

mod envelope;
mod msgpack;

pub use envelope::{
    encode_envelope, EnvelopeDeserializer, DEFAULT_MAX_BODY_SIZE, ENVELOPE_HEADER_SIZE,
};
pub use msgpack::MsgPackCodec;

use crate::error::Result;

/// Contract between the reassembly loop and a stateful decode session.
///
/// A session owns a byte buffer for exactly one connection. `feed`
/// accumulates a chunk and attempts at most one decode; `try_take` surfaces
/// one already buffered complete message without consuming new bytes. Both
/// report malformed bytes as a codec fault, after which the session must
/// not be reused for the same exchange.
pub trait ResponseDeserializer {
    /// Logical message type this session produces.
    type Message;

    /// Accumulate a chunk and attempt one decode.
    ///
    /// Returns `Ok(Some(..))` when the chunk completed a message,
    /// `Ok(None)` when more bytes are needed.
    fn feed(&mut self, chunk: &[u8]) -> Result<Option<Self::Message>>;

    /// Surface one complete message already sitting in the buffer, if any.
    fn try_take(&mut self) -> Result<Option<Self::Message>>;
}
