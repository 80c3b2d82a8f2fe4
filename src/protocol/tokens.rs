//! Protocol field names.
//!
//! The same names are used in three places and must stay in sync:
//! - top-level request message fields,
//! - keys inside query-embedded option strategies,
//! - the two reserved parameter names.
//!
//! [`resolve`](crate::options::resolve) treats a binding under [`G`] or
//! [`LANGUAGE`] as both an ordinary parameter and an override of the
//! matching top-level option. No other name has that side effect.

/// Graph or traversal source alias ("which graph is `g` bound to").
pub const G: &str = "g";

/// Query language identifier.
pub const LANGUAGE: &str = "language";

/// Per-request evaluation timeout override, in milliseconds.
pub const EVAL_TIMEOUT: &str = "evaluationTimeout";

/// Per-request override for the result batch size.
pub const BATCH_SIZE: &str = "batchSize";

/// Policy for returning fully materialized properties vs. references.
pub const MATERIALIZE_PROPERTIES: &str = "materializeProperties";

/// Enables run-length compression of repeated consecutive result elements.
pub const BULKING: &str = "bulking";

/// Field under which parameter bindings travel in a request message.
pub const BINDINGS: &str = "bindings";

/// Parameter names that also overwrite a top-level option when bound.
pub const RESERVED_PARAMETERS: [&str; 2] = [G, LANGUAGE];

/// Check whether a parameter name is reserved.
#[inline]
pub fn is_reserved_parameter(name: &str) -> bool {
    RESERVED_PARAMETERS.contains(&name)
}
