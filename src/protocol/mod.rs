//! Protocol module - message shapes, field names, and failure taxonomy.
//!
//! This module defines the logical protocol layer:
//! - Request/response message structs and their wire field names
//! - The closed failure taxonomy mapping faults to `(status, message, kind)`
//! - Status code constants

mod message;
mod status;
pub mod tokens;

pub use message::{RequestMessage, ResponseMessage, ResponseStatus};
pub use status::{
    truncate_preview, ErrorKind, GraphError, REQUEST_PREVIEW_LIMIT, STATUS_BAD_REQUEST,
    STATUS_INTERNAL_SERVER_ERROR, STATUS_OK, STATUS_REQUEST_ENTITY_TOO_LARGE,
    STATUS_TOO_MANY_REQUESTS,
};
