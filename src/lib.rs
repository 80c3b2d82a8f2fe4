//! # graphwire
//!
//! Correctness core for the Graphwire graph-query protocol.
//!
//! Three concerns live here, shared by every transport binding:
//!
//! - **Options resolution**: merging a query's declaratively attached
//!   option maps and its explicit parameter bindings into one immutable
//!   [`RequestOptions`](options::RequestOptions).
//! - **Failure taxonomy**: a total, closed mapping from any failure cause
//!   to a stable `(status, message, kind)` triple via
//!   [`GraphError`](protocol::GraphError).
//! - **Response reassembly**: turning an unaligned transport chunk stream
//!   back into ordered logical messages with
//!   [`ResponseReassembler`](reassembly::ResponseReassembler).
//!
//! ## Example
//!
//! ```
//! use graphwire::options::{resolve, Query};
//! use graphwire::protocol::RequestMessage;
//! use serde_json::json;
//!
//! let query = Query::new("g.V().has('name', name)")
//!     .parameter("name", json!("marko"));
//!
//! let options = resolve(&query);
//! let request = RequestMessage::new(query.text()).with_options(&options);
//! assert_eq!(request.bulking, Some(true));
//! ```

pub mod codec;
pub mod connection;
pub mod error;
pub mod options;
pub mod protocol;
pub mod reassembly;

pub use error::{GraphwireError, Result};
pub use options::{resolve, RequestOptions};
pub use protocol::{ErrorKind, GraphError, RequestMessage, ResponseMessage, ResponseStatus};
pub use reassembly::ResponseReassembler;
