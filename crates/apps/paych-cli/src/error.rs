//! CLI error types.

use paych_chain::ChainError;
use paych_ops::OpsError;
use paych_store::StoreError;
use paych_types::ErrorCode;
use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Wrong number of arguments or malformed argument.
    #[error("{0}")]
    Usage(String),

    /// Address argument failed to parse.
    #[error("{0}")]
    InvalidAddress(String),

    /// Amount argument failed to parse.
    #[error("{0}")]
    InvalidAmount(String),

    /// Voucher argument failed to decode.
    #[error("{0}")]
    InvalidVoucher(String),

    /// Keystore password needed but none available.
    #[error("Keystore password required. Set PAYCH_PASSWORD or run in a terminal.")]
    PasswordRequired,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine error.
    #[error("{0}")]
    Ops(#[from] OpsError),

    /// Store error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Chain error.
    #[error("{0}")]
    Chain(#[from] ChainError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CliError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User/argument errors: 1
            Self::Usage(_)
            | Self::InvalidAddress(_)
            | Self::InvalidAmount(_)
            | Self::InvalidVoucher(_)
            | Self::PasswordRequired => 1,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) => 3,
            // Chain errors: 5
            Self::Chain(_) => 5,
            // Store errors: 6
            Self::Store(_) => 6,
            // Engine errors: 2, 4, 5, 6, 7, 8 or 10
            Self::Ops(e) => ops_exit_code(e),
            // IO errors: 9
            Self::Io(_) => 9,
            // JSON errors: 10
            Self::Json(_) => 10,
        }
    }

    /// Get the protocol error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Usage(_) => ErrorCode::InvalidArgument,
            Self::InvalidAddress(_) => ErrorCode::InvalidAddress,
            Self::InvalidAmount(_) => ErrorCode::InvalidAmount,
            Self::InvalidVoucher(_) => ErrorCode::InvalidVoucher,
            Self::PasswordRequired => ErrorCode::WalletLocked,
            Self::Config(_) | Self::Toml(_) => ErrorCode::InvalidConfig,

            // Delegated errors
            Self::Ops(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Chain(e) => e.error_code(),
            Self::Io(_) | Self::Json(_) => ErrorCode::InternalError,
        }
    }

    /// Recovery hint for this error, if any.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Ops(e) => e.suggestion(),
            _ => self.error_code().suggestion(),
        }
    }
}

fn ops_exit_code(error: &OpsError) -> i32 {
    match error {
        OpsError::ChannelNotFound(_) | OpsError::KeyNotFound(_) => 2,
        OpsError::InsufficientFunds { .. } | OpsError::AmountBelowRedeemed { .. } => 4,
        OpsError::Chain(_) | OpsError::FaucetUnavailable => 5,
        OpsError::Store(_) => 6,
        OpsError::ExecutionFailed { .. } => 7,
        OpsError::Encode(_) | OpsError::Decode(_) => 10,
        _ => 8,
    }
}
