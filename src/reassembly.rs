//! Reassembling logical response messages from transport chunks.
//!
//! The transport delivers bytes with no alignment to message boundaries:
//! one chunk may hold a fragment of a message, exactly one message, or
//! several coalesced ones. [`ResponseReassembler`] drives a stateful
//! [`ResponseDeserializer`] session so that every complete message is
//! emitted exactly once, in arrival order, regardless of how the bytes
//! were split.
//!
//! # Example
//!
//! ```
//! use graphwire::codec::{encode_envelope, EnvelopeDeserializer};
//! use graphwire::protocol::ResponseMessage;
//! use graphwire::reassembly::ResponseReassembler;
//!
//! let mut reassembler = ResponseReassembler::new(EnvelopeDeserializer::new());
//! let wire = encode_envelope(&ResponseMessage::ok(vec![])).unwrap();
//!
//! let mut messages: Vec<ResponseMessage> = Vec::new();
//! reassembler.on_chunk(&wire[..3], &mut messages).unwrap();
//! assert!(messages.is_empty()); // partial envelope, nothing emitted yet
//!
//! reassembler.on_chunk(&wire[3..], &mut messages).unwrap();
//! assert_eq!(messages.len(), 1);
//! ```

use crate::codec::ResponseDeserializer;
use crate::error::Result;

/// Drives one deserializer session over a connection's chunk stream.
///
/// Processing is strictly sequential and synchronous: chunks go in one at a
/// time, emitted messages come out in decode order, and any flow control is
/// the consumer's business. The session (and its buffer) belongs to exactly
/// one connection; dropping the reassembler discards buffered partial bytes
/// without ever emitting a partial message.
pub struct ResponseReassembler<D> {
    session: D,
}

impl<D> ResponseReassembler<D>
where
    D: ResponseDeserializer,
{
    /// Wrap a fresh deserializer session.
    pub fn new(session: D) -> Self {
        Self { session }
    }

    /// Process one transport chunk, appending every completed message to
    /// `out` in decode order.
    ///
    /// Feeds the chunk for at most one decode, then drains messages the
    /// session had already buffered in full. The drain stops at the first
    /// empty take, so each call does bounded work proportional to the
    /// number of messages the chunk completed.
    ///
    /// # Errors
    ///
    /// A codec fault aborts processing of the chunk immediately; no
    /// resynchronization is attempted. Messages completed before the fault
    /// remain in `out`, so callers can still deliver them before reporting
    /// the failure.
    pub fn on_chunk(&mut self, chunk: &[u8], out: &mut Vec<D::Message>) -> Result<()> {
        if let Some(message) = self.session.feed(chunk)? {
            out.push(message);

            // Two or more messages may have coalesced in this chunk; the
            // session surfaces them one take at a time.
            while let Some(message) = self.session.try_take()? {
                out.push(message);
            }
        }
        Ok(())
    }

    /// Borrow the underlying session.
    pub fn session(&self) -> &D {
        &self.session
    }

    /// Recover the underlying session, e.g. to reset it for reuse on an
    /// independent exchange.
    pub fn into_session(self) -> D {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_envelope, EnvelopeDeserializer};
    use crate::error::GraphwireError;
    use crate::protocol::ResponseMessage;
    use serde_json::json;
    use std::collections::VecDeque;

    fn batch(values: &[i64]) -> ResponseMessage {
        ResponseMessage::batch(values.iter().map(|v| json!(v)).collect())
    }

    fn envelope_reassembler() -> ResponseReassembler<EnvelopeDeserializer<ResponseMessage>> {
        ResponseReassembler::new(EnvelopeDeserializer::new())
    }

    #[test]
    fn test_coalesced_chunk_emits_all_messages_in_order() {
        let mut reassembler = envelope_reassembler();

        let mut chunk = encode_envelope(&batch(&[1])).unwrap();
        chunk.extend_from_slice(&encode_envelope(&batch(&[2])).unwrap());
        chunk.extend_from_slice(&encode_envelope(&ResponseMessage::ok(vec![json!(3)])).unwrap());

        let mut out = Vec::new();
        reassembler.on_chunk(&chunk, &mut out).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0], batch(&[1]));
        assert_eq!(out[1], batch(&[2]));
        assert!(out[2].is_terminal());
    }

    #[test]
    fn test_spanning_message_emits_only_when_complete() {
        let mut reassembler = envelope_reassembler();
        let wire = encode_envelope(&batch(&[1, 2, 3, 4, 5])).unwrap();

        let mut out = Vec::new();
        for fragment in wire.chunks(3) {
            reassembler.on_chunk(fragment, &mut out).unwrap();
        }

        // Zero emissions until the completing fragment, exactly one total.
        assert_eq!(out, vec![batch(&[1, 2, 3, 4, 5])]);
    }

    #[test]
    fn test_no_message_is_emitted_twice() {
        let mut reassembler = envelope_reassembler();

        let first = encode_envelope(&batch(&[1])).unwrap();
        let second = encode_envelope(&batch(&[2])).unwrap();

        // First chunk: all of message one plus a sliver of message two.
        let mut chunk = first.clone();
        chunk.extend_from_slice(&second[..2]);

        let mut out = Vec::new();
        reassembler.on_chunk(&chunk, &mut out).unwrap();
        assert_eq!(out, vec![batch(&[1])]);

        reassembler.on_chunk(&second[2..], &mut out).unwrap();
        assert_eq!(out, vec![batch(&[1]), batch(&[2])]);
    }

    #[test]
    fn test_fault_aborts_chunk_but_keeps_earlier_messages() {
        let session = EnvelopeDeserializer::<ResponseMessage>::with_max_body_size(64);
        let mut reassembler = ResponseReassembler::new(session);

        // A good message followed by a length prefix over the limit.
        let mut chunk = encode_envelope(&batch(&[1])).unwrap();
        chunk.extend_from_slice(&10_000u32.to_be_bytes());

        let mut out = Vec::new();
        let result = reassembler.on_chunk(&chunk, &mut out);

        assert!(matches!(result, Err(GraphwireError::FrameTooLarge { .. })));
        assert_eq!(out, vec![batch(&[1])]);
    }

    /// Deserializer with scripted responses for probing the drive loop.
    struct Scripted {
        feed_results: VecDeque<Result<Option<u32>>>,
        take_results: VecDeque<Result<Option<u32>>>,
        take_calls: usize,
    }

    impl Scripted {
        fn new(
            feed_results: Vec<Result<Option<u32>>>,
            take_results: Vec<Result<Option<u32>>>,
        ) -> Self {
            Self {
                feed_results: feed_results.into(),
                take_results: take_results.into(),
                take_calls: 0,
            }
        }
    }

    impl ResponseDeserializer for Scripted {
        type Message = u32;

        fn feed(&mut self, _chunk: &[u8]) -> Result<Option<u32>> {
            self.feed_results.pop_front().expect("unscripted feed call")
        }

        fn try_take(&mut self) -> Result<Option<u32>> {
            self.take_calls += 1;
            self.take_results.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn test_drain_runs_until_first_empty_take() {
        let session = Scripted::new(
            vec![Ok(Some(1))],
            vec![Ok(Some(2)), Ok(Some(3)), Ok(None), Ok(Some(99))],
        );
        let mut reassembler = ResponseReassembler::new(session);

        let mut out = Vec::new();
        reassembler.on_chunk(b"ignored", &mut out).unwrap();

        assert_eq!(out, vec![1, 2, 3]);
        // Stopped at the None; the scripted Some(99) was never reachable.
        assert_eq!(reassembler.session().take_calls, 3);
    }

    #[test]
    fn test_no_drain_when_feed_yields_nothing() {
        let session = Scripted::new(vec![Ok(None)], vec![Ok(Some(7))]);
        let mut reassembler = ResponseReassembler::new(session);

        let mut out = Vec::new();
        reassembler.on_chunk(b"partial", &mut out).unwrap();

        assert!(out.is_empty());
        assert_eq!(reassembler.session().take_calls, 0);
    }

    #[test]
    fn test_take_fault_propagates_after_feed_success() {
        let session = Scripted::new(
            vec![Ok(Some(1))],
            vec![Err(GraphwireError::Protocol("bad bytes".to_string()))],
        );
        let mut reassembler = ResponseReassembler::new(session);

        let mut out = Vec::new();
        let result = reassembler.on_chunk(b"chunk", &mut out);

        assert!(matches!(result, Err(GraphwireError::Protocol(_))));
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn test_into_session_returns_the_buffer_owner() {
        let mut reassembler = envelope_reassembler();
        let wire = encode_envelope(&batch(&[1])).unwrap();

        let mut out = Vec::new();
        reassembler.on_chunk(&wire[..3], &mut out).unwrap();

        let mut session = reassembler.into_session();
        assert!(!session.is_empty());
        session.clear();
        assert!(session.is_empty());
    }
}
