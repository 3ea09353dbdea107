//! Versioned msgpack envelope for cached values.
//!
//! Every value is written as `{ version, payload }` in named-field form, so a
//! reader can check the version before touching the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Bump when any cached payload changes shape.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("cache format version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    payload: T,
}

pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError> {
    let envelope = EnvelopeRef {
        version: CACHE_FORMAT_VERSION,
        payload,
    };
    Ok(rmp_serde::to_vec_named(&envelope)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let header: Header = rmp_serde::from_slice(bytes)?;
    if header.version != CACHE_FORMAT_VERSION {
        return Err(CodecError::Version {
            found: header.version,
            expected: CACHE_FORMAT_VERSION,
        });
    }
    let envelope: Envelope<T> = rmp_serde::from_slice(bytes)?;
    Ok(envelope.payload)
}
