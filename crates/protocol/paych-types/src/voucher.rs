//! Payment channel vouchers.

use paych_crypto::{Address, Signature};
use serde::{Deserialize, Serialize};

use crate::{Amount, Epoch, Lane, Nonce};

/// A signed, off-chain promise of payment on one lane of a channel.
///
/// `amount` is cumulative for the lane: redeeming nonce 3 with amount 70
/// after nonce 2 with amount 50 pays out 20 more, not 70.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVoucher {
    /// Channel the voucher draws on.
    pub channel: Address,
    /// Lane within the channel.
    pub lane: Lane,
    /// Position in the lane's nonce sequence.
    pub nonce: Nonce,
    /// Cumulative amount payable on the lane.
    pub amount: Amount,
    /// Earliest epoch at which the voucher can be redeemed.
    #[serde(default)]
    pub time_lock_min: Epoch,
    /// Signature by the channel's `from` key. `None` while unsigned.
    pub signature: Option<Signature>,
}

impl SignedVoucher {
    /// Create an unsigned voucher.
    pub fn new(channel: Address, lane: Lane, nonce: Nonce, amount: Amount) -> Self {
        Self {
            channel,
            lane,
            nonce,
            amount,
            time_lock_min: 0,
            signature: None,
        }
    }

    /// Set the earliest redeemable epoch.
    pub fn with_time_lock_min(mut self, epoch: Epoch) -> Self {
        self.time_lock_min = epoch;
        self
    }

    /// Copy of this voucher with the signature cleared.
    ///
    /// This is the form that gets signed.
    pub fn unsigned(&self) -> Self {
        Self {
            signature: None,
            ..self.clone()
        }
    }

    /// Whether a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

impl AsRef<SignedVoucher> for SignedVoucher {
    fn as_ref(&self) -> &SignedVoucher {
        self
    }
}
