//! Error types for paych-crypto

use thiserror::Error;

/// Errors that can occur when parsing keys and addresses
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid prefix in a human-readable address
    #[error("invalid address prefix: expected 'pay1' or 'pay2', got '{0}'")]
    InvalidAddressPrefix(String),

    /// Address string is structurally wrong
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),

    /// Unknown address kind byte in binary form
    #[error("unknown address kind: {0}")]
    UnknownAddressKind(u8),

    /// Invalid base58 encoding
    #[error("invalid base58 encoding: {0}")]
    InvalidBase58(String),

    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Invalid key or payload length
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
