//! Error codes shared by the engine and the CLI.
//!
//! Each engine error maps to one of these codes. The CLI prints the code
//! name next to the message and uses [`ErrorCode::suggestion`] as a hint.

use serde::{Deserialize, Serialize};

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Channel Errors (0x0100 - 0x01FF)
    // =========================================================================
    /// Channel is not in the local registry or on chain
    ChannelNotFound = 0x0100,
    /// Channel is settled, collected, or not yet created on chain
    ChannelNotActive = 0x0101,
    /// Not enough funds in the channel or account
    InsufficientFunds = 0x0102,
    /// Voucher nonce is not above the redeemed nonce
    InvalidNonce = 0x0103,
    /// Voucher signature missing or wrong
    InvalidSignature = 0x0104,
    /// No stored voucher is spendable
    NoSpendableVouchers = 0x0105,
    /// A different voucher already uses this lane and nonce
    VoucherConflict = 0x0106,
    /// Voucher time lock not reached
    TimeLocked = 0x0107,
    /// Voucher belongs to a different channel
    WrongChannel = 0x0108,
    /// A newer voucher in the same lane replaces this one
    Superseded = 0x0109,

    // =========================================================================
    // Input Errors (0x0200 - 0x02FF)
    // =========================================================================
    /// Address string or kind is invalid
    InvalidAddress = 0x0200,
    /// Amount string is invalid
    InvalidAmount = 0x0201,
    /// Voucher string could not be decoded
    InvalidVoucher = 0x0202,
    /// Wrong number or form of command arguments
    InvalidArgument = 0x0203,
    /// Configuration file is malformed
    InvalidConfig = 0x0204,

    // =========================================================================
    // Chain Errors (0x0300 - 0x03FF)
    // =========================================================================
    /// Message rejected before execution
    MessageRejected = 0x0300,
    /// Message executed with a non-zero exit code
    ExecutionFailed = 0x0301,
    /// Timed out waiting for a message
    Timeout = 0x0302,
    /// Chain backend unreachable or failing
    ChainUnavailable = 0x0303,

    // =========================================================================
    // Wallet Errors (0x0400 - 0x04FF)
    // =========================================================================
    /// Address is not in the wallet
    KeyNotFound = 0x0400,
    /// Keystore password is wrong
    WrongPassword = 0x0401,
    /// Operation needs an unlocked wallet
    WalletLocked = 0x0402,
    /// No wallet address is a party to the channel
    NotAParty = 0x0403,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Local storage failure
    StorageError = 0xFFFE,
    /// Internal error
    InternalError = 0xFFFF,
}

impl ErrorCode {
    /// Returns true for channel errors (0x0100-0x01FF)
    pub fn is_channel_error(&self) -> bool {
        (0x0100..=0x01FF).contains(&self.code())
    }

    /// Returns true for input errors (0x0200-0x02FF)
    pub fn is_input_error(&self) -> bool {
        (0x0200..=0x02FF).contains(&self.code())
    }

    /// Returns true for chain errors (0x0300-0x03FF)
    pub fn is_chain_error(&self) -> bool {
        (0x0300..=0x03FF).contains(&self.code())
    }

    /// Returns true for wallet errors (0x0400-0x04FF)
    pub fn is_wallet_error(&self) -> bool {
        (0x0400..=0x04FF).contains(&self.code())
    }

    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get a user-facing hint for recovering from this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ChannelNotFound => Some("Check the address with 'paych list', or add a voucher to register it."),
            Self::ChannelNotActive => Some("Check the channel with 'paych status'."),
            Self::InsufficientFunds => Some("Fund the account with 'paych wallet fund' or create a larger channel."),
            Self::InvalidNonce => Some("A voucher with this nonce was already redeemed. Create a new voucher."),
            Self::InvalidSignature => Some("The voucher was not signed by the channel's payer."),
            Self::NoSpendableVouchers => Some("List vouchers with 'paych voucher list'."),
            Self::VoucherConflict => Some("Another voucher uses this lane and nonce. Use a new nonce."),
            Self::TimeLocked => Some("Wait for the time lock epoch. Check it with 'paych chain head'."),
            Self::WrongChannel => Some("The voucher was issued for a different channel."),
            Self::Superseded => Some("Submit the newest voucher in the lane instead."),
            Self::InvalidAddress => Some("Addresses start with 'pay1' (accounts) or 'pay2' (channels)."),
            Self::InvalidAmount => Some("Amounts are whole numbers of base units."),
            Self::InvalidVoucher => Some("Pass the voucher string exactly as printed by 'paych voucher create'."),
            Self::InvalidArgument => Some("Run the command with --help for its arguments."),
            Self::InvalidConfig => Some("Check the config file, or pass --config to use another one."),
            Self::MessageRejected => Some("Check the account nonce and signer."),
            Self::ExecutionFailed => Some("Check channel state with 'paych status'."),
            Self::Timeout => Some("The message may still execute. Retry the lookup later."),
            Self::ChainUnavailable => Some("Check the chain database path in the config."),
            Self::KeyNotFound => Some("List wallet addresses with 'paych wallet list'."),
            Self::WrongPassword => Some("Check PAYCH_PASSWORD or re-enter the password."),
            Self::WalletLocked => Some("Set PAYCH_PASSWORD or run interactively."),
            Self::NotAParty => Some("Only the channel payer or payee can do this."),
            Self::StorageError => Some("Check permissions on the data directory."),
            Self::InternalError => Some("An internal error occurred. Please report this issue."),
        }
    }

    /// Category name based on the code range.
    pub fn category(&self) -> &'static str {
        if self.is_channel_error() {
            "Channel"
        } else if self.is_input_error() {
            "Input"
        } else if self.is_chain_error() {
            "Chain"
        } else if self.is_wallet_error() {
            "Wallet"
        } else {
            "Internal"
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::ChannelNotFound => "CHANNEL_NOT_FOUND",
            ErrorCode::ChannelNotActive => "CHANNEL_NOT_ACTIVE",
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::InvalidNonce => "INVALID_NONCE",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::NoSpendableVouchers => "NO_SPENDABLE_VOUCHERS",
            ErrorCode::VoucherConflict => "VOUCHER_CONFLICT",
            ErrorCode::TimeLocked => "TIME_LOCKED",
            ErrorCode::WrongChannel => "WRONG_CHANNEL",
            ErrorCode::Superseded => "SUPERSEDED",
            ErrorCode::InvalidAddress => "INVALID_ADDRESS",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::InvalidVoucher => "INVALID_VOUCHER",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::MessageRejected => "MESSAGE_REJECTED",
            ErrorCode::ExecutionFailed => "EXECUTION_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ChainUnavailable => "CHAIN_UNAVAILABLE",
            ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
            ErrorCode::WrongPassword => "WRONG_PASSWORD",
            ErrorCode::WalletLocked => "WALLET_LOCKED",
            ErrorCode::NotAParty => "NOT_A_PARTY",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}
