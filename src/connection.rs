//! Per-connection response delivery.
//!
//! This module owns the read side of one connection: a dedicated reader
//! task pulls chunks off the transport, runs them through a
//! [`ResponseReassembler`], and forwards complete messages into a bounded
//! delivery queue. The reassembler emits synchronously; all flow control
//! lives in the queue between the reader task and the consumer.
//!
//! # Architecture
//!
//! ```text
//! Transport ─► Reader Task ─► ResponseReassembler ─► mpsc (bounded) ─► Consumer
//! ```
//!
//! Decode faults never surface as bare transport failures: the reader
//! classifies the fault, delivers one terminal [`ResponseMessage`] carrying
//! the classified error, and stops reading. The byte stream past a fault
//! cannot be trusted, so no resynchronization is attempted.
//!
//! # Example
//!
//! ```ignore
//! use graphwire::connection::{spawn_response_reader, ConnectionConfig};
//!
//! let (mut responses, reader) = spawn_response_reader(stream, ConnectionConfig::default());
//!
//! while let Some(message) = responses.recv().await {
//!     println!("batch of {} results", message.result.len());
//!     if message.is_terminal() {
//!         break;
//!     }
//! }
//! ```

use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::{EnvelopeDeserializer, DEFAULT_MAX_BODY_SIZE};
use crate::error::{GraphwireError, Result};
use crate::protocol::{GraphError, ResponseMessage};
use crate::reassembly::ResponseReassembler;

/// Default capacity of the delivery queue.
pub const DEFAULT_DELIVERY_CAPACITY: usize = 64;

/// Default transport read buffer size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for a connection's reader task.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum allowed envelope body size.
    pub max_body_size: u32,
    /// Capacity of the bounded delivery queue.
    pub delivery_capacity: usize,
    /// Size of the transport read buffer.
    pub read_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            delivery_capacity: DEFAULT_DELIVERY_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Consumer end of a connection's delivery queue.
pub struct ResponseReceiver {
    rx: mpsc::Receiver<ResponseMessage>,
}

impl ResponseReceiver {
    /// Receive the next message, in arrival order.
    ///
    /// Returns `None` once the reader has stopped and the queue is drained.
    pub async fn recv(&mut self) -> Option<ResponseMessage> {
        self.rx.recv().await
    }
}

/// Classify a decode fault into the protocol error taxonomy.
///
/// Oversized frames map to the payload-limit error; every other codec
/// fault is a serialization failure.
pub fn classify_decode_fault(fault: &GraphwireError) -> GraphError {
    match fault {
        GraphwireError::FrameTooLarge { .. } => GraphError::frame_too_large(fault),
        _ => GraphError::serialization(fault),
    }
}

/// Spawn the reader task for one connection.
///
/// Returns the delivery queue's consumer end and the task handle. The task
/// finishes with `Ok(())` on clean EOF (or when the receiver is dropped)
/// and with the underlying fault after a decode error. Dropping the
/// receiver tears the reader down; buffered partial bytes are discarded
/// without ever emitting a partial message.
pub fn spawn_response_reader<R>(
    reader: R,
    config: ConnectionConfig,
) -> (ResponseReceiver, JoinHandle<Result<()>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.delivery_capacity);
    let task = tokio::spawn(read_loop(reader, config, tx));
    (ResponseReceiver { rx }, task)
}

/// Main read loop - reassembles chunks and forwards messages downstream.
async fn read_loop<R>(
    mut reader: R,
    config: ConnectionConfig,
    tx: mpsc::Sender<ResponseMessage>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let session = EnvelopeDeserializer::with_max_body_size(config.max_body_size);
    let mut reassembler = ResponseReassembler::new(session);
    let mut buf = vec![0u8; config.read_buffer_size];
    let mut messages = Vec::new();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("Connection closed by peer");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) => return Err(GraphwireError::Io(e)),
        };

        // Chunks are processed strictly in arrival order on this task.
        let fault = reassembler.on_chunk(&buf[..n], &mut messages).err();

        // Deliver messages completed before any fault.
        for message in messages.drain(..) {
            if tx.send(message).await.is_err() {
                tracing::debug!("Delivery queue closed, stopping reader");
                return Ok(());
            }
        }

        if let Some(fault) = fault {
            tracing::warn!("Decode fault, aborting exchange: {}", fault);
            let error = classify_decode_fault(&fault);
            let _ = tx.send(ResponseMessage::from_error(error)).await;
            return Err(fault);
        }
    }
}
