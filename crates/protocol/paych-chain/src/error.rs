//! Error types for the chain layer.

use paych_crypto::Address;
use paych_types::{ErrorCode, MessageId, Nonce};
use paych_wire::{DecodeError, EncodeError};
use thiserror::Error;

/// Result type alias for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors from talking to the chain.
///
/// A message that executes with a non-zero exit code is not an error at this
/// layer; it produces a receipt.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Message signature does not verify.
    #[error("message rejected: invalid signature")]
    InvalidSignature,

    /// Message `from` is not the signer's account.
    #[error("message rejected: sender {from} does not match signer {signer}")]
    SenderMismatch {
        /// Claimed sender
        from: Address,
        /// Account of the signing key
        signer: Address,
    },

    /// Message nonce is not the sender's next nonce.
    #[error("message rejected: nonce {got}, expected {expected}")]
    NonceMismatch {
        /// Sender's next nonce
        expected: Nonce,
        /// Nonce in the message
        got: Nonce,
    },

    /// Message rejected for another reason.
    #[error("message rejected: {0}")]
    Rejected(String),

    /// Message id not known to the chain.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// Waiting for a message took too long (retryable).
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Chain backend unreachable (retryable).
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// Local chain database error.
    #[error("chain database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Encoding failure.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Decoding failure.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Internal error (lock poisoning, unexpected state).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Create a new Rejected error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Create a new Timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new Unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the message was refused before execution.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature
                | Self::SenderMismatch { .. }
                | Self::NonceMismatch { .. }
                | Self::Rejected(_)
        )
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }

    /// Map to the protocol error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Timeout(_) => ErrorCode::Timeout,
            e if e.is_rejection() => ErrorCode::MessageRejected,
            Self::Unavailable(_) | Self::Database(_) | Self::MessageNotFound(_) => {
                ErrorCode::ChainUnavailable
            }
            _ => ErrorCode::InternalError,
        }
    }
}
