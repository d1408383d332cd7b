//! Reasons a voucher is not valid or not spendable.

use paych_types::{Amount, Epoch, ErrorCode, Nonce};
use thiserror::Error;

/// Why a voucher was rejected.
///
/// Variants are listed in the order the checks run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotSpendable {
    /// The voucher names a different channel
    #[error("voucher is for channel {voucher_channel}, not {channel}")]
    WrongChannel {
        /// Channel being checked
        channel: String,
        /// Channel the voucher names
        voucher_channel: String,
    },

    /// The channel does not accept vouchers
    #[error("channel is not active: {0}")]
    ChannelNotActive(String),

    /// The voucher carries no signature
    #[error("voucher is not signed")]
    MissingSignature,

    /// The signature does not verify against the channel's from key
    #[error("voucher signature is invalid")]
    InvalidSignature,

    /// A voucher with this or a higher nonce was already redeemed in the lane
    #[error("voucher nonce {nonce} is not above redeemed nonce {redeemed_nonce}")]
    StaleNonce {
        /// Voucher nonce
        nonce: Nonce,
        /// Highest redeemed nonce in the lane
        redeemed_nonce: Nonce,
    },

    /// Redeeming would pay out more than the channel holds
    #[error("voucher would bring total redeemed to {required}, channel balance is {balance}")]
    ExceedsBalance {
        /// Total redeemed across lanes after this voucher
        required: i128,
        /// Escrowed balance
        balance: Amount,
    },

    /// The time lock has not been reached
    #[error("voucher is time locked until epoch {time_lock_min} (current epoch {epoch})")]
    TimeLocked {
        /// Earliest redeemable epoch
        time_lock_min: Epoch,
        /// Current epoch
        epoch: Epoch,
    },

    /// A valid voucher with a higher nonce exists in the same lane
    #[error("voucher is superseded by nonce {by_nonce} in the same lane")]
    Superseded {
        /// Nonce of the newer voucher
        by_nonce: Nonce,
    },
}

impl NotSpendable {
    /// The matching error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::WrongChannel { .. } => ErrorCode::WrongChannel,
            Self::ChannelNotActive(_) => ErrorCode::ChannelNotActive,
            Self::MissingSignature | Self::InvalidSignature => ErrorCode::InvalidSignature,
            Self::StaleNonce { .. } => ErrorCode::InvalidNonce,
            Self::ExceedsBalance { .. } => ErrorCode::InsufficientFunds,
            Self::TimeLocked { .. } => ErrorCode::TimeLocked,
            Self::Superseded { .. } => ErrorCode::Superseded,
        }
    }
}

/// Result type for validation functions.
pub type ValidationResult<T> = std::result::Result<T, NotSpendable>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = NotSpendable::StaleNonce {
            nonce: 2,
            redeemed_nonce: 3,
        };
        assert_eq!(err.to_string(), "voucher nonce 2 is not above redeemed nonce 3");

        let err = NotSpendable::ExceedsBalance {
            required: 150,
            balance: 100,
        };
        assert!(err.to_string().contains("150"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            NotSpendable::MissingSignature.error_code(),
            ErrorCode::InvalidSignature
        );
        assert_eq!(
            NotSpendable::Superseded { by_nonce: 4 }.error_code(),
            ErrorCode::Superseded
        );
    }
}
