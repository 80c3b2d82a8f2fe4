//! Options module - per-request options and their resolution.
//!
//! This module covers the request-side configuration surface:
//!
//! - [`RequestOptions`] - immutable per-request options value
//! - [`RequestOptionsBuilder`] - direct construction
//! - [`resolve`] - merge of a query's attached option sources
//!
//! # Example
//!
//! ```
//! use graphwire::options::{resolve, OptionsStrategy, Query};
//! use serde_json::json;
//!
//! let query = Query::new("g.V().has('name', name)")
//!     .strategy(OptionsStrategy::new().option("batchSize", json!(64)))
//!     .parameter("name", json!("marko"));
//!
//! let options = resolve(&query);
//! assert_eq!(options.batch_size(), Some(64));
//! assert!(options.bulking());
//! ```

mod request;
mod resolver;

pub use request::{RequestOptions, RequestOptionsBuilder};
pub use resolver::{resolve, OptionsStrategy, Query};
