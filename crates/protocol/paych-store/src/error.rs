//! Error types for the storage layer.

use paych_crypto::Address;
use paych_types::{ErrorCode, Lane, Nonce};
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel already registered.
    #[error("Channel already registered: {0}")]
    ChannelExists(Address),

    /// Channel not in the registry.
    #[error("Channel not found: {0}")]
    ChannelNotFound(Address),

    /// A voucher with this key is already stored.
    #[error("Voucher already stored for lane {lane}, nonce {nonce}")]
    VoucherExists { lane: Lane, nonce: Nonce },

    /// Voucher not in the store.
    #[error("Voucher not found for lane {lane}, nonce {nonce}")]
    VoucherNotFound { lane: Lane, nonce: Nonce },

    /// No key stored for the address.
    #[error("Key not found: {0}")]
    KeyNotFound(Address),

    /// A key is already stored for the address.
    #[error("Key already exists: {0}")]
    KeyExists(Address),

    /// Decryption failed.
    #[error("Wrong password for {0}")]
    WrongPassword(Address),

    /// Encryption/decryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Schema initialization error.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid data format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Lock poisoning error.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Create an encryption error.
    pub fn encryption(msg: impl Into<String>) -> Self {
        StoreError::Encryption(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        StoreError::Schema(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        StoreError::InvalidData(msg.into())
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        StoreError::LockPoisoned(msg.into())
    }

    /// Map to the protocol error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::ChannelNotFound(_) => ErrorCode::ChannelNotFound,
            StoreError::VoucherExists { .. } => ErrorCode::VoucherConflict,
            StoreError::KeyNotFound(_) => ErrorCode::KeyNotFound,
            StoreError::WrongPassword(_) => ErrorCode::WrongPassword,
            _ => ErrorCode::StorageError,
        }
    }
}
