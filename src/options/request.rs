//! Immutable per-request options.

use serde_json::{Map, Value};

use crate::protocol::tokens;

/// Options that can be supplied on a per-request basis.
///
/// Immutable once built: construction goes through [`RequestOptionsBuilder`]
/// (or [`resolve`](crate::options::resolve) for options derived from a
/// query), after which a value is only ever read. One `RequestOptions` can
/// therefore be shared read-only across any number of concurrent
/// submissions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestOptions {
    source_alias: Option<String>,
    parameters: Option<Map<String, Value>>,
    batch_size: Option<i32>,
    timeout_millis: Option<i64>,
    language: Option<String>,
    materialize_properties: Option<String>,
    bulking: bool,
}

impl RequestOptions {
    /// Options with every field absent and bulking disabled.
    ///
    /// Note the asymmetry with [`resolve`](crate::options::resolve), which
    /// enables bulking by default even for a query carrying no options at
    /// all: a bare options value has no origin context and must not switch
    /// on a behavior-changing feature by itself.
    pub const EMPTY: RequestOptions = RequestOptions {
        source_alias: None,
        parameters: None,
        batch_size: None,
        timeout_millis: None,
        language: None,
        materialize_properties: None,
        bulking: false,
    };

    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Graph or traversal source the request should be aliased to.
    #[inline]
    pub fn source_alias(&self) -> Option<&str> {
        self.source_alias.as_deref()
    }

    /// Query parameter bindings, in insertion order.
    #[inline]
    pub fn parameters(&self) -> Option<&Map<String, Value>> {
        self.parameters.as_ref()
    }

    /// Per-request override for the server's result batch size.
    #[inline]
    pub fn batch_size(&self) -> Option<i32> {
        self.batch_size
    }

    /// Per-request evaluation deadline override, in milliseconds.
    #[inline]
    pub fn timeout_millis(&self) -> Option<i64> {
        self.timeout_millis
    }

    /// Language identifier the query text is written in.
    #[inline]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Property materialization mode for returned elements.
    #[inline]
    pub fn materialize_properties(&self) -> Option<&str> {
        self.materialize_properties.as_deref()
    }

    /// Whether the server may compress runs of repeated results into a
    /// single element plus a count.
    #[inline]
    pub fn bulking(&self) -> bool {
        self.bulking
    }
}

/// Builder for [`RequestOptions`]. Every setter consumes and returns the
/// builder; `build` produces the immutable value.
#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    source_alias: Option<String>,
    parameters: Option<Map<String, Value>>,
    batch_size: Option<i32>,
    timeout_millis: Option<i64>,
    language: Option<String>,
    materialize_properties: Option<String>,
    bulking: bool,
}

impl RequestOptionsBuilder {
    /// Alias the request to a graph or traversal source.
    pub fn source_alias(mut self, alias: impl Into<String>) -> Self {
        self.source_alias = Some(alias.into());
        self
    }

    /// Add a query parameter binding.
    ///
    /// The reserved names `g` and `language` are stored like any other
    /// parameter but additionally overwrite the corresponding top-level
    /// option when the bound value is a string. Only these two names get
    /// that treatment.
    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if name == tokens::G {
            if let Some(alias) = value.as_str() {
                self.source_alias = Some(alias.to_string());
            }
        }
        if name == tokens::LANGUAGE {
            if let Some(language) = value.as_str() {
                self.language = Some(language.to_string());
            }
        }
        self.parameters.get_or_insert_with(Map::new).insert(name, value);
        self
    }

    /// Override the server-configured result batch size for this request.
    pub fn batch_size(mut self, batch_size: i32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Override the server-configured evaluation timeout, in milliseconds.
    pub fn timeout_millis(mut self, timeout_millis: i64) -> Self {
        self.timeout_millis = Some(timeout_millis);
        self
    }

    /// Language identifier to send with the request.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Property materialization mode to send with the request.
    pub fn materialize_properties(mut self, materialize_properties: impl Into<String>) -> Self {
        self.materialize_properties = Some(materialize_properties.into());
        self
    }

    /// Enable or disable result bulking on the server.
    ///
    /// Worth enabling when the response is likely to contain consecutive
    /// duplicates; otherwise it only adds a small overhead.
    pub fn bulking(mut self, bulking: bool) -> Self {
        self.bulking = bulking;
        self
    }

    pub fn build(self) -> RequestOptions {
        RequestOptions {
            source_alias: self.source_alias,
            parameters: self.parameters,
            batch_size: self.batch_size,
            timeout_millis: self.timeout_millis,
            language: self.language,
            materialize_properties: self.materialize_properties,
            bulking: self.bulking,
        }
    }
}
