//! Request and response message shapes.
//!
//! A request carries the query text plus optional per-request fields under
//! their protocol names (see [`tokens`](super::tokens)). A response is one
//! or more [`ResponseMessage`] values per exchange: zero or more
//! intermediate batches without a status, closed by exactly one terminal
//! message carrying a [`ResponseStatus`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::status::{ErrorKind, GraphError, STATUS_OK};
use crate::options::RequestOptions;

/// A single query submission.
///
/// Serializes as one flat map of protocol field names; optional fields are
/// omitted entirely when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Query text to evaluate.
    pub query: String,
    /// Graph or traversal source alias.
    #[serde(rename = "g", skip_serializing_if = "Option::is_none", default)]
    pub source_alias: Option<String>,
    /// Language identifier for the query text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
    /// Evaluation deadline override, in milliseconds.
    #[serde(
        rename = "evaluationTimeout",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub evaluation_timeout: Option<i64>,
    /// Result batch size override.
    #[serde(rename = "batchSize", skip_serializing_if = "Option::is_none", default)]
    pub batch_size: Option<i32>,
    /// Property materialization mode.
    #[serde(
        rename = "materializeProperties",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub materialize_properties: Option<String>,
    /// Server-side bulking toggle.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bulking: Option<bool>,
    /// Query parameter bindings, in insertion order.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bindings: Option<Map<String, Value>>,
}

impl RequestMessage {
    /// Request carrying only the query text.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            source_alias: None,
            language: None,
            evaluation_timeout: None,
            batch_size: None,
            materialize_properties: None,
            bulking: None,
            bindings: None,
        }
    }

    /// Copy every populated option onto the request.
    ///
    /// Only fields the options actually carry are written; `bulking` is
    /// written only when enabled. Applying [`RequestOptions::EMPTY`] leaves
    /// the request untouched.
    pub fn with_options(mut self, options: &RequestOptions) -> Self {
        if let Some(alias) = options.source_alias() {
            self.source_alias = Some(alias.to_string());
        }
        if let Some(parameters) = options.parameters() {
            if !parameters.is_empty() {
                self.bindings = Some(parameters.clone());
            }
        }
        if let Some(batch_size) = options.batch_size() {
            self.batch_size = Some(batch_size);
        }
        if let Some(timeout) = options.timeout_millis() {
            self.evaluation_timeout = Some(timeout);
        }
        if let Some(language) = options.language() {
            self.language = Some(language.to_string());
        }
        if let Some(materialize) = options.materialize_properties() {
            self.materialize_properties = Some(materialize.to_string());
        }
        if options.bulking() {
            self.bulking = Some(true);
        }
        self
    }
}

impl fmt::Display for RequestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestMessage{{query={}", self.query)?;
        if let Some(alias) = &self.source_alias {
            write!(f, ", g={}", alias)?;
        }
        if let Some(bindings) = &self.bindings {
            write!(f, ", bindings={:?}", bindings)?;
        }
        f.write_str("}")
    }
}

/// Completion status attached to the terminal message of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// Protocol status code.
    pub code: u16,
    /// Diagnostic text. Empty on success, never empty on a failure.
    #[serde(default)]
    pub message: String,
    /// Failure kind, absent on success.
    #[serde(rename = "exceptionKind", skip_serializing_if = "Option::is_none", default)]
    pub exception: Option<ErrorKind>,
}

impl ResponseStatus {
    /// Status of a successfully completed exchange.
    pub fn ok() -> Self {
        Self {
            code: STATUS_OK,
            message: String::new(),
            exception: None,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.code == STATUS_OK
    }
}

impl From<GraphError> for ResponseStatus {
    fn from(error: GraphError) -> Self {
        Self {
            code: error.code(),
            message: error.message().to_string(),
            exception: Some(error.kind()),
        }
    }
}

/// One logical response message.
///
/// Intermediate batches carry results and no status; the terminal message
/// carries the status (and possibly a final batch of results).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Result elements in this batch.
    #[serde(default)]
    pub result: Vec<Value>,
    /// Present only on the terminal message of the exchange.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<ResponseStatus>,
}

impl ResponseMessage {
    /// Intermediate batch, more messages to follow.
    pub fn batch(result: Vec<Value>) -> Self {
        Self {
            result,
            status: None,
        }
    }

    /// Terminal message with an explicit status.
    pub fn terminal(result: Vec<Value>, status: ResponseStatus) -> Self {
        Self {
            result,
            status: Some(status),
        }
    }

    /// Terminal message of a successful exchange.
    pub fn ok(result: Vec<Value>) -> Self {
        Self::terminal(result, ResponseStatus::ok())
    }

    /// Terminal message carrying a classified failure.
    pub fn from_error(error: GraphError) -> Self {
        Self::terminal(Vec::new(), error.into())
    }

    /// Whether this message closes its exchange.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_some()
    }
}
