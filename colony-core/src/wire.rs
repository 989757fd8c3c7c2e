//! Binary wire codec.
//!
//! Fixed-width big-endian integers, fields in declaration order, no
//! version tag. Strings carry a u64 length prefix. Decoding is bounded by
//! [`MAX_PAYLOAD_BYTES`] and rejects trailing bytes, so a payload decodes
//! to exactly one value or fails.

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Largest payload the codec will produce or accept.
pub const MAX_PAYLOAD_BYTES: u64 = 32 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .with_limit(MAX_PAYLOAD_BYTES)
        .reject_trailing_bytes()
}

/// Encode `value` into a fresh buffer.
///
/// # Errors
/// Returns `ColonyError::Codec` if the value does not fit the payload limit.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(options().serialize(value)?)
}

/// Decode exactly one `T` from `bytes`.
///
/// # Errors
/// Returns `ColonyError::Codec` on truncated, oversized or trailing input.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(options().deserialize(bytes)?)
}
