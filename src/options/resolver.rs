//! Resolving [`RequestOptions`] from the options a query carries.
//!
//! A query can pick up options from two ranked sources: option maps
//! attached declaratively through a configuration strategy, and explicit
//! parameter bindings. [`resolve`] merges both into one immutable
//! [`RequestOptions`], strategies first, parameters second. Resolution is
//! a pure merge with no failure path: values of an unusable type are
//! ignored here and left for downstream validation to reject.

use serde_json::{Map, Value};

use super::request::RequestOptions;
use crate::protocol::tokens;

/// One declaratively attached option map, as produced by a "configure this
/// traversal" step. Keys use the protocol field names from [`tokens`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionsStrategy {
    options: Map<String, Value>,
}

impl OptionsStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option on this strategy.
    pub fn option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    #[inline]
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }
}

/// A query together with the option sources attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    strategies: Vec<OptionsStrategy>,
    parameters: Map<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strategies: Vec::new(),
            parameters: Map::new(),
        }
    }

    /// Attach a strategy-derived option map. Order matters: later
    /// strategies overwrite earlier ones for the same key.
    pub fn strategy(mut self, strategy: OptionsStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Bind a named query parameter. Insertion order is preserved.
    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn strategies(&self) -> &[OptionsStrategy] {
        &self.strategies
    }

    #[inline]
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// Merge a query's option sources into one [`RequestOptions`].
///
/// Strategies apply left-to-right over `{evaluationTimeout, batchSize,
/// materializeProperties, language, bulking}`; parameter bindings apply
/// afterwards in insertion order, so a reserved `g` or `language` binding
/// wins over any strategy-set value. Bulking defaults to enabled for
/// query-derived options (streamed results commonly contain duplicates),
/// in contrast to [`RequestOptions::EMPTY`].
pub fn resolve(query: &Query) -> RequestOptions {
    let mut builder = RequestOptions::builder().bulking(true);

    for strategy in query.strategies() {
        let options = strategy.options();
        if let Some(timeout) = options.get(tokens::EVAL_TIMEOUT).and_then(Value::as_i64) {
            builder = builder.timeout_millis(timeout);
        }
        if let Some(batch_size) = options.get(tokens::BATCH_SIZE).and_then(Value::as_i64) {
            builder = builder.batch_size(batch_size as i32);
        }
        if let Some(materialize) = options.get(tokens::MATERIALIZE_PROPERTIES).and_then(Value::as_str) {
            builder = builder.materialize_properties(materialize);
        }
        if let Some(language) = options.get(tokens::LANGUAGE).and_then(Value::as_str) {
            builder = builder.language(language);
        }
        if let Some(bulking) = options.get(tokens::BULKING).and_then(Value::as_bool) {
            builder = builder.bulking(bulking);
        }
    }

    for (name, value) in query.parameters() {
        builder = builder.parameter(name.clone(), value.clone());
    }

    builder.build()
}
