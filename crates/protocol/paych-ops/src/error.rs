//! Error types for the engine.

use paych_chain::ChainError;
use paych_crypto::Address;
use paych_store::StoreError;
use paych_types::{Amount, ErrorCode, ExitCode, Lane, Nonce};
use paych_valid::NotSpendable;
use paych_wire::{DecodeError, EncodeError};
use thiserror::Error;

/// Result type for engine operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    // =========================================================================
    // Channel Errors
    // =========================================================================
    /// Channel is not in the local registry.
    #[error("channel not found: {0}")]
    ChannelNotFound(Address),

    /// Channel missing on chain, settled or collected.
    #[error("channel not active: {0}")]
    ChannelNotActive(String),

    /// Vouchers can only be created on channels we pay into.
    #[error("channel {0} is not outbound")]
    NotOutbound(Address),

    /// No local wallet address is a party to the channel.
    #[error("no wallet address is a party to channel {0}")]
    NotAParty(Address),

    // =========================================================================
    // Voucher Errors
    // =========================================================================
    /// Voucher total across lanes would exceed the channel balance.
    #[error("insufficient funds in channel: need {required}, balance {balance}")]
    InsufficientFunds {
        /// Sum of all lanes including the new voucher
        required: u128,
        /// Channel balance on chain
        balance: Amount,
    },

    /// Voucher amount below what the lane already redeemed.
    #[error("voucher amount {amount} is below lane redeemed amount {redeemed}")]
    AmountBelowRedeemed {
        /// Requested cumulative amount
        amount: Amount,
        /// Amount already redeemed on chain
        redeemed: Amount,
    },

    /// Nothing in the store is spendable.
    #[error("No spendable vouchers for that channel")]
    NoSpendableVouchers,

    /// A different voucher is stored under the same lane and nonce.
    #[error("conflicting voucher already stored for lane {lane}, nonce {nonce}")]
    VoucherConflict {
        /// Lane
        lane: Lane,
        /// Nonce
        nonce: Nonce,
    },

    // =========================================================================
    // Chain Errors
    // =========================================================================
    /// Message executed with a non-zero exit code.
    #[error("message execution failed (exit code {exit_code})")]
    ExecutionFailed {
        /// Exit code from the receipt
        exit_code: ExitCode,
    },

    /// No faucet configured for this chain.
    #[error("no faucet available on this chain")]
    FaucetUnavailable,

    // =========================================================================
    // Wallet Errors
    // =========================================================================
    /// Address not held by the wallet.
    #[error("address not found in wallet: {0}")]
    KeyNotFound(Address),

    /// Keys cannot be used without a password.
    #[error("wallet is locked: a password is required")]
    WalletLocked,

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// Chain transport or rejection.
    #[error("{0}")]
    Chain(#[from] ChainError),

    /// Storage error.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Voucher evaluation failure.
    #[error("{0}")]
    Validation(#[from] NotSpendable),

    /// Encoding failure.
    #[error("{0}")]
    Encode(#[from] EncodeError),

    /// Decoding failure.
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

impl OpsError {
    /// Create a channel-not-active error.
    pub fn channel_not_active(reason: impl Into<String>) -> Self {
        OpsError::ChannelNotActive(reason.into())
    }

    /// Get the protocol error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ChannelNotFound(_) => ErrorCode::ChannelNotFound,
            Self::ChannelNotActive(_) => ErrorCode::ChannelNotActive,
            Self::NotOutbound(_) | Self::NotAParty(_) => ErrorCode::NotAParty,

            Self::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            Self::AmountBelowRedeemed { .. } => ErrorCode::InvalidAmount,
            Self::NoSpendableVouchers => ErrorCode::NoSpendableVouchers,
            Self::VoucherConflict { .. } => ErrorCode::VoucherConflict,

            Self::ExecutionFailed { .. } => ErrorCode::ExecutionFailed,
            Self::FaucetUnavailable => ErrorCode::ChainUnavailable,

            Self::KeyNotFound(_) => ErrorCode::KeyNotFound,
            Self::WalletLocked => ErrorCode::WalletLocked,

            Self::Chain(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Encode(_) => ErrorCode::InternalError,
            Self::Decode(_) => ErrorCode::InvalidVoucher,
        }
    }

    /// Get a user-facing hint for recovering from this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotOutbound(_) => Some("Vouchers can only be created by the channel payer."),
            Self::FaucetUnavailable => Some("Funding is only available on the local devnet."),
            _ => self.error_code().suggestion(),
        }
    }

    /// Returns true if the operation may succeed on retry.
    ///
    /// Execution failures are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Chain(e) => e.is_retryable(),
            _ => false,
        }
    }
}
