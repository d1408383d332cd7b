//! Error types for encoding and decoding.

use thiserror::Error;

/// Errors that can occur when encoding a value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// CBOR encoding failed
    #[error("CBOR encoding failed: {0}")]
    Cbor(String),
}

impl From<ciborium::ser::Error<std::io::Error>> for EncodeError {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        EncodeError::Cbor(err.to_string())
    }
}

/// Errors that can occur when decoding a value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Failed to decode CBOR payload
    #[error("payload decode failed: {0}")]
    PayloadDecodeFailed(String),

    /// Voucher string is not valid base58
    #[error("invalid voucher encoding: {0}")]
    InvalidEncoding(String),

    /// Input was empty
    #[error("empty input")]
    Empty,

    /// Bytes left over after the value
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

impl From<ciborium::de::Error<std::io::Error>> for DecodeError {
    fn from(err: ciborium::de::Error<std::io::Error>) -> Self {
        DecodeError::PayloadDecodeFailed(err.to_string())
    }
}
