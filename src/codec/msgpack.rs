//! MessagePack codec using `rmp-serde`.
//!
//! Always `to_vec_named`, never `to_vec`: the server and the other language
//! drivers decode message bodies as maps keyed by field name. `to_vec`
//! serializes structs as positional arrays, which those decoders reject.
//!
//! # Example
//!
//! ```
//! use graphwire::codec::MsgPackCodec;
//! use graphwire::protocol::RequestMessage;
//!
//! let request = RequestMessage::new("g.V().count()");
//! let encoded = MsgPackCodec::encode(&request).unwrap();
//! let decoded: RequestMessage = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, request);
//! ```

use crate::error::Result;

/// MessagePack codec for message bodies.
///
/// Uses `rmp_serde::to_vec_named` so structs serialize as maps (with field
/// names) rather than arrays (positional).
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MessagePack bytes in struct-as-map format.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MessagePack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be deserialized to type `T`.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
