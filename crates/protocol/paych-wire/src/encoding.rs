//! Deterministic CBOR encoding.
//!
//! Every signed or hashed structure goes through [`encode_payload`]. Struct
//! fields serialize in declaration order and maps are `BTreeMap`s, so the
//! same value always yields the same bytes.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{DecodeError, EncodeError};

/// Encode a value to CBOR.
pub fn encode_payload<T: Serialize>(payload: &T) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    ciborium::into_writer(payload, &mut buf)?;
    Ok(buf)
}

/// Decode a CBOR value, rejecting trailing bytes.
pub fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.len()));
    }
    Ok(value)
}
