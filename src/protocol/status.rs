//! Protocol failure classification.
//!
//! Whatever stage detects a fault - request validation, query evaluation,
//! result serialization, response framing - the failure is mapped here onto
//! a stable `(status, message, kind)` triple, and that triple is what lands
//! in the terminal status of the failing exchange. Clients branch on
//! [`ErrorKind`] (a closed, versioned vocabulary) and must treat `message`
//! as diagnostic text only: wording, counts and truncation may change
//! between releases, kinds may not.
//!
//! Every factory on [`GraphError`] is total and deterministic: it always
//! produces a non-empty message, a status out of {400, 413, 429, 500} and a
//! kind from the closed set. New failure causes map onto an existing kind
//! rather than minting a new one.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::message::RequestMessage;
use super::tokens;

/// Exchange completed successfully.
pub const STATUS_OK: u16 = 200;
/// Request could not be understood or fails validation.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Request or response payload exceeds a configured size limit.
pub const STATUS_REQUEST_ENTITY_TOO_LARGE: u16 = 413;
/// Admission or throughput limit exceeded.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;
/// Server-side failure during evaluation or serialization.
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Maximum bytes of user-supplied request text echoed into an error message.
///
/// Oversized-request errors would otherwise reflect the very payload that
/// caused them back at the client.
pub const REQUEST_PREVIEW_LIMIT: usize = 1021;

/// Marker appended to a preview that was cut at [`REQUEST_PREVIEW_LIMIT`].
const PREVIEW_MARKER: &str = "...";

/// Closed set of protocol failure kinds.
///
/// Serialized under the `exceptionKind` key of a response status. The set is
/// part of the protocol contract: values are stable across versions and
/// clients are expected to match on them exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed, unrecognized or invalid request content.
    InvalidRequest,
    /// Evaluation exceeded a configured or time-boxed deadline.
    ServerTimeoutExceeded,
    /// Admission control rejected the request.
    TooManyRequests,
    /// Result (de)serialization failed.
    ServerSerialization,
    /// Request or response payload over a configured size limit.
    RequestEntityTooLarge,
    /// Explicit abort raised from within query evaluation.
    ServerFailStep,
    /// Uncategorized query evaluation failure.
    ServerEvaluation,
    /// Fallback when no other kind applies.
    ServerError,
}

impl ErrorKind {
    /// Every kind, in the order of the protocol mapping table.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::InvalidRequest,
        ErrorKind::ServerTimeoutExceeded,
        ErrorKind::TooManyRequests,
        ErrorKind::ServerSerialization,
        ErrorKind::RequestEntityTooLarge,
        ErrorKind::ServerFailStep,
        ErrorKind::ServerEvaluation,
        ErrorKind::ServerError,
    ];

    /// Wire string for this kind (the serde form matches).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::ServerTimeoutExceeded => "ServerTimeoutExceeded",
            ErrorKind::TooManyRequests => "TooManyRequests",
            ErrorKind::ServerSerialization => "ServerSerialization",
            ErrorKind::RequestEntityTooLarge => "RequestEntityTooLarge",
            ErrorKind::ServerFailStep => "ServerFailStep",
            ErrorKind::ServerEvaluation => "ServerEvaluation",
            ErrorKind::ServerError => "ServerError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified protocol failure: status code, diagnostic message, kind.
///
/// Produced once per fault by one of the factories below, then serialized
/// verbatim into the response status of the failing exchange. Immutable
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphError {
    code: u16,
    message: String,
    kind: ErrorKind,
}

impl GraphError {
    fn new(code: u16, message: String, kind: ErrorKind) -> Self {
        debug_assert!(!message.is_empty());
        Self {
            code,
            message,
            kind,
        }
    }

    /// Protocol status code, one of 400, 413, 429 or 500.
    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Diagnostic message. Never empty, wording not stable.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stable failure kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    // ------------ request validation failures

    /// Request bytes deserialized but the message shape is not valid.
    pub fn malformed_request(request: &RequestMessage) -> Self {
        let message = format!(
            "Message could not be parsed. Check the format of the request. [{}]",
            request
        );
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// The request carries an operation of a type the server does not know.
    pub fn unknown_operation(operation: &str) -> Self {
        let message = format!("Message with operation of type [{}] is not recognized.", operation);
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// One or more binding keys are structurally invalid.
    pub fn invalid_bindings() -> Self {
        Self::new(
            STATUS_BAD_REQUEST,
            "The message is using one or more invalid binding keys - they must be non-empty strings."
                .to_string(),
            ErrorKind::InvalidRequest,
        )
    }

    /// One or more binding keys collide with reserved names.
    pub fn reserved_bindings(names: &[&str]) -> Self {
        let message = format!(
            "The message supplies one or more invalid parameter keys of [{}] - these are reserved names.",
            names.join(", ")
        );
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// More bindings than the server configuration allows.
    pub fn excess_bindings(count: usize, allowed: usize) -> Self {
        let message = format!(
            "The message contains {} bindings which is more than is allowed by the server {} configuration.",
            count, allowed
        );
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// The aliased source does not resolve to anything configured.
    pub fn unresolved_alias(aliased: &str) -> Self {
        let message = format!(
            "Could not alias [{}] to [{}] as [{}] is not a configured graph or traversal source.",
            tokens::G,
            aliased,
            aliased
        );
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// The request omits the source argument entirely.
    pub fn missing_source() -> Self {
        let message = format!("A query message requires a [{}] argument.", tokens::G);
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// The named source exists in the request but not on the server.
    pub fn unconfigured_source(source: &str) -> Self {
        let message = format!(
            "The traversal source [{}] for alias [{}] is not configured on the server.",
            source,
            tokens::G
        );
        Self::new(STATUS_BAD_REQUEST, message, ErrorKind::InvalidRequest)
    }

    /// The query embeds a function the server refuses to evaluate.
    pub fn unsupported_function(cause: &dyn StdError) -> Self {
        Self::new(STATUS_BAD_REQUEST, message_or_debug(cause), ErrorKind::InvalidRequest)
    }

    /// The query body itself failed to deserialize.
    pub fn query_deserialization(cause: &dyn StdError) -> Self {
        Self::new(STATUS_BAD_REQUEST, message_or_debug(cause), ErrorKind::InvalidRequest)
    }

    // ------------ execution failures

    /// Evaluation ran past the configured deadline.
    pub fn timeout(request: &RequestMessage) -> Self {
        let message = format!(
            "A timeout occurred during traversal evaluation of [{}] - consider increasing the limit given to {}",
            request,
            tokens::EVAL_TIMEOUT
        );
        Self::new(STATUS_INTERNAL_SERVER_ERROR, message, ErrorKind::ServerTimeoutExceeded)
    }

    /// The time-boxed interrupt fired, independent of the deadline mechanism.
    pub fn timed_interrupt() -> Self {
        Self::new(
            STATUS_INTERNAL_SERVER_ERROR,
            "Timeout during query evaluation triggered by the timed interrupt.".to_string(),
            ErrorKind::ServerTimeoutExceeded,
        )
    }

    /// Admission control turned the request away.
    pub fn rate_limited() -> Self {
        Self::new(
            STATUS_TOO_MANY_REQUESTS,
            "Too many requests have been sent in a given amount of time.".to_string(),
            ErrorKind::TooManyRequests,
        )
    }

    /// Result (de)serialization failed mid-exchange.
    pub fn serialization(cause: &dyn StdError) -> Self {
        let message = format!("Error during serialization: {}", first_message(cause));
        Self::new(STATUS_INTERNAL_SERVER_ERROR, message, ErrorKind::ServerSerialization)
    }

    /// A response frame exceeds the configured size limit.
    pub fn frame_too_large(cause: &dyn StdError) -> Self {
        let message = format!(
            "{} - increase the configured maximum body size",
            message_or_debug(cause)
        );
        Self::new(
            STATUS_REQUEST_ENTITY_TOO_LARGE,
            message,
            ErrorKind::RequestEntityTooLarge,
        )
    }

    /// The submitted query exceeds the compiled-size limit.
    ///
    /// The echoed request text is capped at [`REQUEST_PREVIEW_LIMIT`].
    pub fn request_too_large(request: &RequestMessage) -> Self {
        let message = format!(
            "The query that was submitted exceeds the maximum compilation size allowed by the server, please split it into multiple smaller statements - {}",
            truncate_preview(&request.to_string())
        );
        Self::new(
            STATUS_REQUEST_ENTITY_TOO_LARGE,
            message,
            ErrorKind::RequestEntityTooLarge,
        )
    }

    /// Explicit abort raised from within query evaluation.
    pub fn fail_step(message: &str) -> Self {
        let message = if message.is_empty() {
            "Query evaluation was aborted by an explicit fail step.".to_string()
        } else {
            message.to_string()
        };
        Self::new(STATUS_INTERNAL_SERVER_ERROR, message, ErrorKind::ServerFailStep)
    }

    /// Uncategorized failure during query evaluation.
    pub fn evaluation(cause: &dyn StdError) -> Self {
        Self::new(
            STATUS_INTERNAL_SERVER_ERROR,
            message_or_debug(cause),
            ErrorKind::ServerEvaluation,
        )
    }

    /// Fallback when no other category applies.
    pub fn general(cause: &dyn StdError) -> Self {
        Self::new(
            STATUS_INTERNAL_SERVER_ERROR,
            message_or_debug(cause),
            ErrorKind::ServerError,
        )
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.kind, self.message)
    }
}

impl StdError for GraphError {}

/// Truncate user-supplied text to [`REQUEST_PREVIEW_LIMIT`] bytes, appending
/// a marker when anything was cut. Never splits a UTF-8 code point.
pub fn truncate_preview(text: &str) -> String {
    if text.len() <= REQUEST_PREVIEW_LIMIT {
        return text.to_string();
    }
    let mut end = REQUEST_PREVIEW_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &text[..end], PREVIEW_MARKER)
}

/// Display text of the cause, falling back to its Debug form when the
/// Display output is empty. Guarantees a non-empty result.
fn message_or_debug(cause: &dyn StdError) -> String {
    let text = cause.to_string();
    if text.is_empty() {
        format!("{:?}", cause)
    } else {
        text
    }
}

/// First non-empty message along the cause chain, falling back to the Debug
/// form of the outermost error.
fn first_message(cause: &dyn StdError) -> String {
    let mut current: Option<&dyn StdError> = Some(cause);
    while let Some(err) = current {
        let text = err.to_string();
        if !text.is_empty() {
            return text;
        }
        current = err.source();
    }
    format!("{:?}", cause)
}
